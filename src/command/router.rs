//! Command routing
//!
//! A raw line is split into sub-commands, each parsed against an ordered
//! rule table into an [`Intent`], and the intent executed. The first
//! matching rule wins; parsing is stateless so every rule can be tested in
//! isolation. Unrecognized commands get a journal notice and a spoken
//! apology, never an error that stops the loop.

use std::sync::Arc;
use std::sync::OnceLock;

use chrono::{DateTime, Local};
use regex::Regex;
use tracing::debug;

use crate::command::builtins::{current_date_phrase, current_time_phrase, pick_joke};
use crate::command::splitter::{is_word_char, split_commands};
use crate::journal::SharedJournal;
use crate::launch::desktop::Desktop;
use crate::launch::resolver::LaunchResolver;
use crate::notes::NoteStore;
use crate::reminder::ReminderScheduler;
use crate::speech::SpeechHandle;
use crate::GoferError;

/// What a single sub-command asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    WriteNote {
        title: Option<String>,
        content: String,
    },
    ListNotes,
    OpenNote {
        query: String,
    },
    Open {
        target: String,
    },
    Joke,
    Time,
    Date,
    RemindIn {
        minutes: i64,
        message: String,
    },
    RemindAt {
        hour: u32,
        minute: u32,
        message: String,
    },
    BadReminderTime,
    ListReminders,
    CancelReminders,
    Quit,
}

/// Whether dispatch should keep going or wind the program down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Continue,
    Quit,
}

type Rule = fn(&str, &str) -> Option<Intent>;

/// Rule table in priority order. Note rules come before the generic open
/// rule so "open note x" is a note lookup while "open notepad" is a launch.
const RULES: &[(&str, Rule)] = &[
    ("write-note", rule_write_note),
    ("save-note", rule_save_note),
    ("list-notes", rule_list_notes),
    ("open-note", rule_open_note),
    ("open", rule_open),
    ("joke", rule_joke),
    ("time", rule_time),
    ("date", rule_date),
    ("remind-in", rule_remind_in),
    ("remind-at", rule_remind_at),
    ("list-reminders", rule_list_reminders),
    ("cancel-reminders", rule_cancel_reminders),
    ("quit", rule_quit),
];

/// Parse one sub-command against the rule table.
pub fn parse_command(raw: &str) -> Option<Intent> {
    let lower = raw.to_lowercase();
    for (name, rule) in RULES {
        if let Some(intent) = rule(raw, &lower) {
            debug!(rule = name, "command matched");
            return Some(intent);
        }
    }
    None
}

/// Strip a leading keyword phrase, case-insensitively, if it ends at a
/// word boundary. Returns the trimmed remainder.
fn strip_keyword<'a>(raw: &'a str, keyword: &str) -> Option<&'a str> {
    let prefix = raw.get(..keyword.len())?;
    if !prefix.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = raw.get(keyword.len()..)?;
    match rest.chars().next() {
        None => Some(""),
        Some(c) if !is_word_char(c) => Some(rest.trim()),
        Some(_) => None,
    }
}

fn parse_note_body(rest: &str) -> Intent {
    match rest.split_once(':') {
        Some((title, content)) => {
            let title = title.trim();
            Intent::WriteNote {
                title: (!title.is_empty()).then(|| title.to_string()),
                content: content.trim().to_string(),
            }
        }
        None => Intent::WriteNote {
            title: None,
            content: rest.to_string(),
        },
    }
}

fn rule_write_note(raw: &str, _lower: &str) -> Option<Intent> {
    strip_keyword(raw, "write note").map(parse_note_body)
}

fn rule_save_note(raw: &str, _lower: &str) -> Option<Intent> {
    strip_keyword(raw, "save note").map(parse_note_body)
}

fn rule_list_notes(raw: &str, _lower: &str) -> Option<Intent> {
    strip_keyword(raw, "list notes").map(|_| Intent::ListNotes)
}

fn rule_open_note(raw: &str, _lower: &str) -> Option<Intent> {
    strip_keyword(raw, "open note").map(|query| Intent::OpenNote {
        query: query.to_string(),
    })
}

fn rule_open(raw: &str, _lower: &str) -> Option<Intent> {
    let target = strip_keyword(raw, "open")?;
    if target.is_empty() {
        return None;
    }
    Some(Intent::Open {
        target: target.to_string(),
    })
}

fn rule_joke(_raw: &str, lower: &str) -> Option<Intent> {
    lower.contains("joke").then(|| Intent::Joke)
}

fn rule_time(_raw: &str, lower: &str) -> Option<Intent> {
    (lower == "time").then(|| Intent::Time)
}

fn rule_date(_raw: &str, lower: &str) -> Option<Intent> {
    (lower == "date").then(|| Intent::Date)
}

fn remind_in_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^remind me in (\d+)\s*minutes? to (.+)$").expect("valid pattern")
    })
}

fn remind_at_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^remind me at (\d{1,2}):(\d{2}) to (.+)$").expect("valid pattern")
    })
}

fn rule_remind_in(raw: &str, _lower: &str) -> Option<Intent> {
    let caps = remind_in_re().captures(raw)?;
    let intent = match caps[1].parse::<i64>() {
        Ok(minutes) => Intent::RemindIn {
            minutes,
            message: caps[2].trim().to_string(),
        },
        Err(_) => Intent::BadReminderTime,
    };
    Some(intent)
}

fn rule_remind_at(raw: &str, _lower: &str) -> Option<Intent> {
    let caps = remind_at_re().captures(raw)?;
    let hour: u32 = match caps[1].parse() {
        Ok(h) => h,
        Err(_) => return Some(Intent::BadReminderTime),
    };
    let minute: u32 = match caps[2].parse() {
        Ok(m) => m,
        Err(_) => return Some(Intent::BadReminderTime),
    };
    if hour > 23 || minute > 59 {
        return Some(Intent::BadReminderTime);
    }
    Some(Intent::RemindAt {
        hour,
        minute,
        message: caps[3].trim().to_string(),
    })
}

fn rule_list_reminders(_raw: &str, lower: &str) -> Option<Intent> {
    (lower == "list reminders").then(|| Intent::ListReminders)
}

fn rule_cancel_reminders(_raw: &str, lower: &str) -> Option<Intent> {
    (lower == "cancel all reminders").then(|| Intent::CancelReminders)
}

fn rule_quit(_raw: &str, lower: &str) -> Option<Intent> {
    (lower == "quit" || lower == "exit").then(|| Intent::Quit)
}

/// A requested wall-clock time means today if still ahead, otherwise
/// tomorrow.
fn remind_at_target(now: DateTime<Local>, hour: u32, minute: u32) -> Option<DateTime<Local>> {
    let today = now
        .date_naive()
        .and_hms_opt(hour, minute, 0)?
        .and_local_timezone(Local)
        .earliest()?;
    if today > now {
        return Some(today);
    }
    now.date_naive()
        .succ_opt()?
        .and_hms_opt(hour, minute, 0)?
        .and_local_timezone(Local)
        .earliest()
}

/// Dispatches parsed commands to their handlers.
pub struct Router {
    journal: SharedJournal,
    speech: SpeechHandle,
    scheduler: ReminderScheduler,
    notes: NoteStore,
    resolver: LaunchResolver,
    desktop: Arc<dyn Desktop>,
}

impl Router {
    pub fn new(
        journal: SharedJournal,
        speech: SpeechHandle,
        scheduler: ReminderScheduler,
        notes: NoteStore,
        resolver: LaunchResolver,
        desktop: Arc<dyn Desktop>,
    ) -> Self {
        Self {
            journal,
            speech,
            scheduler,
            notes,
            resolver,
            desktop,
        }
    }

    /// Split a raw line into sub-commands and dispatch each in order.
    /// A quit command stops the line.
    pub fn dispatch_line(&self, line: &str) -> DispatchOutcome {
        for part in split_commands(line) {
            if self.dispatch_one(&part) == DispatchOutcome::Quit {
                return DispatchOutcome::Quit;
            }
        }
        DispatchOutcome::Continue
    }

    /// Dispatch a single sub-command.
    pub fn dispatch_one(&self, cmd: &str) -> DispatchOutcome {
        let cmd = cmd.trim();
        if cmd.is_empty() {
            return DispatchOutcome::Continue;
        }
        self.journal.log(&format!("Command: {}", cmd));

        match parse_command(cmd) {
            Some(intent) => self.execute(intent),
            None => {
                self.journal.log("I didn't understand that.");
                self.speech
                    .speak(GoferError::Parse(cmd.to_string()).user_message());
                DispatchOutcome::Continue
            }
        }
    }

    fn execute(&self, intent: Intent) -> DispatchOutcome {
        match intent {
            Intent::WriteNote { title, content } => {
                if content.is_empty() {
                    self.journal.log("No note content provided.");
                    self.speech
                        .speak("You didn't provide any content for the note.");
                } else {
                    self.write_and_open_note(title.as_deref(), &content);
                }
            }
            Intent::ListNotes => self.list_notes(),
            Intent::OpenNote { query } => {
                if query.is_empty() {
                    self.journal.log("No note name provided to open.");
                    self.speech
                        .speak("Please tell me the name of the note to open.");
                } else {
                    self.open_note(&query);
                }
            }
            Intent::Open { target } => {
                self.resolver.resolve(&target);
            }
            Intent::Joke => {
                let joke = pick_joke();
                self.journal.log(&format!("Joke: {}", joke));
                self.speech.speak(joke);
            }
            Intent::Time => {
                let now = current_time_phrase();
                self.speech.speak(format!("The time is {}.", now));
                self.journal.log(&format!("Time: {}", now));
            }
            Intent::Date => {
                let today = current_date_phrase();
                self.speech.speak(format!("Today's date is {}.", today));
                self.journal.log(&format!("Date: {}", today));
            }
            Intent::RemindIn { minutes, message } => {
                if let Err(e) = self.scheduler.schedule_in(minutes, &message) {
                    debug!("reminder rejected: {}", e);
                }
            }
            Intent::RemindAt {
                hour,
                minute,
                message,
            } => match remind_at_target(Local::now(), hour, minute) {
                Some(at) => {
                    if let Err(e) = self.scheduler.schedule_at(at, &message) {
                        debug!("reminder rejected: {}", e);
                    }
                }
                None => self.bad_reminder_time(),
            },
            Intent::BadReminderTime => self.bad_reminder_time(),
            Intent::ListReminders => self.list_reminders(),
            Intent::CancelReminders => self.scheduler.cancel_all(),
            Intent::Quit => {
                self.journal.log("Shutting down.");
                self.speech.speak("Goodbye.");
                return DispatchOutcome::Quit;
            }
        }
        DispatchOutcome::Continue
    }

    fn bad_reminder_time(&self) {
        self.journal.log("Could not parse reminder time.");
        self.speech.speak("I couldn't parse the time you gave me.");
    }

    fn write_and_open_note(&self, title: Option<&str>, content: &str) {
        match self.notes.write(title, content) {
            Ok(note) => {
                self.journal
                    .log(&format!("Note saved: {}", note.path.display()));
                self.speech
                    .speak(format!("Saved note {}. Opening it now.", note.title));
                if let Err(e) = self.desktop.default_open(&note.path.to_string_lossy()) {
                    self.journal
                        .log(&format!("Could not open note automatically: {}", e));
                    self.speech
                        .speak("Saved the note but couldn't open it automatically.");
                }
            }
            Err(e) => {
                self.journal.log(&format!("Error saving note: {}", e));
                self.speech.speak("There was an error saving the note.");
            }
        }
    }

    fn list_notes(&self) {
        match self.notes.list() {
            Ok(notes) if notes.is_empty() => {
                self.journal.log("No notes found in GoferNotes.");
                self.speech.speak("You have no notes.");
            }
            Ok(notes) => {
                self.journal.log("Notes:");
                for path in &notes {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    self.journal.log(&format!(" - {}", name));
                }
                self.speech
                    .speak(format!("You have {} note(s).", notes.len()));
            }
            Err(e) => {
                self.journal.log(&format!("Could not list notes: {}", e));
                self.speech.speak(e.user_message());
            }
        }
    }

    fn open_note(&self, query: &str) {
        match self.notes.find(query) {
            Ok(None) => {
                self.journal
                    .log(&format!("No note matching '{}' was found.", query));
                self.speech.speak("I couldn't find a matching note.");
            }
            Ok(Some(path)) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.journal.log(&format!("Opening note: {}", name));
                self.speech.speak(format!("Opening note {}", name));
                if let Err(e) = self.desktop.default_open(&path.to_string_lossy()) {
                    self.journal.log(&format!("Could not open note: {}", e));
                    self.speech.speak("I couldn't open the note.");
                }
            }
            Err(e) => {
                self.journal.log(&format!("Could not search notes: {}", e));
                self.speech.speak(e.user_message());
            }
        }
    }

    fn list_reminders(&self) {
        let reminders = self.scheduler.list();
        if reminders.is_empty() {
            self.journal.log("No reminders scheduled.");
            self.speech.speak("You have no reminders.");
            return;
        }
        self.journal.log("Scheduled reminders:");
        for r in &reminders {
            self.journal.log(&format!(
                " - {} : {}",
                r.at.format("%Y-%m-%d %H:%M"),
                r.message
            ));
        }
        self.speech
            .speak(format!("You have {} reminder(s).", reminders.len()));
    }
}
