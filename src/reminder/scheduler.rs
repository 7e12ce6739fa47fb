//! Reminder registry and scheduling
//!
//! All reminder state lives inside the scheduler behind one mutex. Each
//! reminder owns a cancellable timer; on firing it announces itself through
//! the journal and the speech queue and removes its own registry entry, so
//! the listing only ever shows pending reminders.
//!
//! Cancellation is best-effort. A reminder firing concurrently with
//! `cancel_all` may still announce itself; callers must tolerate that.

use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::journal::SharedJournal;
use crate::reminder::timer::{self, TimerHandle};
use crate::speech::SpeechHandle;
use crate::{GoferError, Result};

/// Lifecycle of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    Scheduled,
    Fired,
    Canceled,
}

/// Snapshot of one reminder.
#[derive(Debug, Clone)]
pub struct Reminder {
    pub id: Uuid,
    pub at: DateTime<Local>,
    pub message: String,
    pub state: ReminderState,
}

struct Entry {
    id: Uuid,
    at: DateTime<Local>,
    message: String,
    state: ReminderState,
    timer: TimerHandle,
}

impl Entry {
    fn snapshot(&self) -> Reminder {
        Reminder {
            id: self.id,
            at: self.at,
            message: self.message.clone(),
            state: self.state,
        }
    }
}

/// Schedules reminders and announces them when they fire.
#[derive(Clone)]
pub struct ReminderScheduler {
    registry: Arc<Mutex<Vec<Entry>>>,
    journal: SharedJournal,
    speech: SpeechHandle,
}

impl ReminderScheduler {
    pub fn new(journal: SharedJournal, speech: SpeechHandle) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Vec::new())),
            journal,
            speech,
        }
    }

    /// Schedule a reminder for an absolute time.
    ///
    /// Rejects times that are not strictly in the future before any timer
    /// is created. On success the reminder is announced and its identity
    /// returned.
    pub fn schedule_at(&self, at: DateTime<Local>, message: &str) -> Result<Reminder> {
        let now = Local::now();
        if at <= now {
            self.journal.log("Reminder time is in the past.");
            self.speech.speak("I can't set a reminder in the past.");
            return Err(GoferError::Scheduling(format!(
                "reminder time {} is not in the future",
                at.format("%Y-%m-%d %H:%M")
            )));
        }

        let delay = (at - now)
            .to_std()
            .map_err(|e| GoferError::Scheduling(e.to_string()))?;

        let id = Uuid::new_v4();
        let registry = self.registry.clone();
        let journal = self.journal.clone();
        let speech = self.speech.clone();
        let fired_message = message.to_string();

        // The lock spans timer creation and insertion so a near-immediate
        // fire cannot look up its entry before it exists.
        let snapshot = {
            let mut entries = self.registry.lock();
            let timer = timer::schedule(delay, move || {
                speech.speak(format!("Reminder: {}", fired_message));
                journal.log(&format!("Reminder triggered: {}", fired_message));
                let mut entries = registry.lock();
                for entry in entries.iter_mut() {
                    if entry.id == id {
                        entry.state = ReminderState::Fired;
                    }
                }
                entries.retain(|entry| entry.state == ReminderState::Scheduled);
            });

            let entry = Entry {
                id,
                at,
                message: message.to_string(),
                state: ReminderState::Scheduled,
                timer,
            };
            let snapshot = entry.snapshot();
            entries.push(entry);
            snapshot
        };

        self.journal.log(&format!(
            "Reminder scheduled at {}: {}",
            at.format("%Y-%m-%d %H:%M"),
            message
        ));
        self.speech.speak(format!(
            "Reminder set for {}.",
            at.format("%I:%M %p on %B %d")
        ));
        debug!(id = %snapshot.id, "reminder scheduled");

        Ok(snapshot)
    }

    /// Schedule a reminder a number of minutes from now.
    pub fn schedule_in(&self, minutes: i64, message: &str) -> Result<Reminder> {
        let offset = chrono::Duration::try_minutes(minutes).ok_or_else(|| {
            GoferError::Scheduling(format!("offset of {} minutes is out of range", minutes))
        })?;
        let at = Local::now().checked_add_signed(offset).ok_or_else(|| {
            GoferError::Scheduling(format!("offset of {} minutes is out of range", minutes))
        })?;
        self.schedule_at(at, message)
    }

    /// Snapshot of all scheduled reminders in registry order.
    pub fn list(&self) -> Vec<Reminder> {
        self.registry
            .lock()
            .iter()
            .filter(|entry| entry.state == ReminderState::Scheduled)
            .map(Entry::snapshot)
            .collect()
    }

    /// Cancel every pending reminder and empty the registry.
    pub fn cancel_all(&self) {
        {
            let mut entries = self.registry.lock();
            for entry in entries.iter_mut() {
                entry.timer.cancel();
                entry.state = ReminderState::Canceled;
            }
            entries.clear();
        }
        self.journal.log("All reminders canceled.");
        self.speech.speak("All reminders have been canceled.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::MemoryJournal;
    use crate::speech::{SpeechOutput, Synthesizer};
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use std::time::Duration;

    struct RecordingSynth {
        spoken: Arc<Mutex<Vec<String>>>,
    }

    impl Synthesizer for RecordingSynth {
        fn speak(&mut self, text: &str) -> crate::Result<()> {
            self.spoken.lock().push(text.to_string());
            Ok(())
        }
    }

    fn speech_fixture() -> (SpeechOutput, Arc<Mutex<Vec<String>>>) {
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let spoken_clone = spoken.clone();
        let journal: SharedJournal = Arc::new(MemoryJournal::new());
        let output = SpeechOutput::start(
            move || {
                Ok(Box::new(RecordingSynth {
                    spoken: spoken_clone,
                }) as Box<dyn Synthesizer>)
            },
            journal,
            Arc::new(AtomicBool::new(false)),
            Duration::from_millis(20),
        );
        (output, spoken)
    }

    fn scheduler_fixture() -> (
        ReminderScheduler,
        MemoryJournal,
        Arc<Mutex<Vec<String>>>,
        SpeechOutput,
    ) {
        let journal = MemoryJournal::new();
        let (output, spoken) = speech_fixture();
        let scheduler = ReminderScheduler::new(Arc::new(journal.clone()), output.handle());
        (scheduler, journal, spoken, output)
    }

    #[test]
    fn test_past_time_rejected_before_any_timer() {
        let (scheduler, journal, spoken, mut output) = scheduler_fixture();

        let past = Local::now() - chrono::Duration::minutes(5);
        let result = scheduler.schedule_at(past, "too late");

        assert!(matches!(result, Err(GoferError::Scheduling(_))));
        assert!(scheduler.list().is_empty());
        assert!(journal.contains("Reminder time is in the past."));

        thread::sleep(Duration::from_millis(100));
        assert!(spoken
            .lock()
            .iter()
            .any(|s| s == "I can't set a reminder in the past."));

        output.handle().shutdown();
        output.join();
    }

    #[test]
    fn test_negative_offset_rejected() {
        let (scheduler, journal, _spoken, mut output) = scheduler_fixture();

        assert!(scheduler.schedule_in(-1, "yesterday").is_err());
        assert!(scheduler.list().is_empty());
        assert!(journal.contains("Reminder time is in the past."));

        output.handle().shutdown();
        output.join();
    }

    #[test]
    fn test_fires_with_exact_message_and_leaves_registry() {
        let (scheduler, journal, spoken, mut output) = scheduler_fixture();

        let at = Local::now() + chrono::Duration::milliseconds(120);
        let reminder = scheduler
            .schedule_at(at, "stretch")
            .unwrap_or_else(|e| panic!("schedule failed: {}", e));
        assert_eq!(reminder.message, "stretch");
        assert_eq!(reminder.state, ReminderState::Scheduled);
        assert_eq!(scheduler.list().len(), 1);
        assert!(journal.contains("Reminder scheduled at"));

        thread::sleep(Duration::from_millis(600));

        assert!(journal.contains("Reminder triggered: stretch"));
        assert!(spoken.lock().iter().any(|s| s == "Reminder: stretch"));
        assert!(scheduler.list().is_empty());

        output.handle().shutdown();
        output.join();
    }

    #[test]
    fn test_cancel_all_empties_registry_and_suppresses_firing() {
        let (scheduler, journal, _spoken, mut output) = scheduler_fixture();

        let soon = Local::now() + chrono::Duration::milliseconds(200);
        let later = Local::now() + chrono::Duration::seconds(30);
        scheduler
            .schedule_at(soon, "first")
            .unwrap_or_else(|e| panic!("schedule failed: {}", e));
        scheduler
            .schedule_at(later, "second")
            .unwrap_or_else(|e| panic!("schedule failed: {}", e));
        assert_eq!(scheduler.list().len(), 2);

        scheduler.cancel_all();

        assert!(scheduler.list().is_empty());
        assert!(journal.contains("All reminders canceled."));

        thread::sleep(Duration::from_millis(500));
        assert!(!journal.contains("Reminder triggered"));

        output.handle().shutdown();
        output.join();
    }

    #[test]
    fn test_list_preserves_registry_order() {
        let (scheduler, _journal, _spoken, mut output) = scheduler_fixture();

        let base = Local::now() + chrono::Duration::seconds(60);
        scheduler
            .schedule_at(base + chrono::Duration::seconds(10), "second")
            .unwrap_or_else(|e| panic!("schedule failed: {}", e));
        scheduler
            .schedule_at(base, "first")
            .unwrap_or_else(|e| panic!("schedule failed: {}", e));

        let listed = scheduler.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].message, "second");
        assert_eq!(listed[1].message, "first");

        output.handle().shutdown();
        output.join();
    }
}
