//! Assistant lifecycle
//!
//! Wires the input aggregator, command router, reminder scheduler, speech
//! worker and optional background listener together, and drives the polling
//! command loop from startup to orderly shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::{debug, info, warn};

use crate::command::{DispatchOutcome, Router};
use crate::input::{spawn_listener, CommandSubmitter, InputAggregator, SpeechRecognizer};
use crate::integration::config::GoferConfig;
use crate::journal::SharedJournal;
use crate::launch::{Desktop, LaunchResolver};
use crate::notes::NoteStore;
use crate::reminder::ReminderScheduler;
use crate::speech::{SpeechOutput, Synthesizer};

/// The running assistant.
///
/// Owns every worker thread plus the shared stop flag, and drives the
/// polling loop that drains queued commands into the router. Consuming
/// [`run`](Orchestrator::run) or [`shutdown`](Orchestrator::shutdown)
/// tears the workers down in order.
pub struct Orchestrator {
    /// Runtime settings for the loop and shutdown pacing
    config: GoferConfig,

    /// Queue the command loop drains
    aggregator: InputAggregator,

    /// Parses and executes drained commands
    router: Router,

    /// Reminder registry, cancelled wholesale at shutdown
    scheduler: ReminderScheduler,

    /// Speech worker, joined at shutdown
    speech: SpeechOutput,

    /// Background listener thread, when voice input is enabled
    listener: Option<thread::JoinHandle<()>>,

    /// Cooperative stop flag observed by every worker
    stop: Arc<AtomicBool>,
}

impl Orchestrator {
    /// Start all workers.
    ///
    /// The synthesizer factory runs on the speech worker thread, so an
    /// unavailable speech engine degrades that worker without failing
    /// startup. Passing no recognizer disables voice input and leaves
    /// typed commands as the only producer.
    pub fn start<F>(
        config: GoferConfig,
        journal: SharedJournal,
        synthesizer: F,
        desktop: Arc<dyn Desktop>,
        recognizer: Option<Box<dyn SpeechRecognizer>>,
    ) -> Self
    where
        F: FnOnce() -> crate::Result<Box<dyn Synthesizer>> + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));

        let speech = SpeechOutput::start(
            synthesizer,
            journal.clone(),
            stop.clone(),
            config.speech_wait(),
        );
        let speech_handle = speech.handle();

        let aggregator = InputAggregator::new();
        let scheduler = ReminderScheduler::new(journal.clone(), speech_handle.clone());
        let notes = NoteStore::new(config.notes_dir());
        let resolver = LaunchResolver::new(desktop.clone(), journal.clone(), speech_handle.clone());
        let router = Router::new(
            journal.clone(),
            speech_handle.clone(),
            scheduler.clone(),
            notes,
            resolver,
            desktop,
        );

        let listener = match recognizer {
            Some(recognizer) => Some(spawn_listener(
                recognizer,
                aggregator.submitter(),
                journal.clone(),
                speech_handle,
                stop.clone(),
            )),
            None => {
                journal.log("Speech listener disabled; typed commands only.");
                None
            }
        };

        info!("assistant started");

        Self {
            config,
            aggregator,
            router,
            scheduler,
            speech,
            listener,
            stop,
        }
    }

    /// Producer handle for feeding commands in.
    pub fn submitter(&self) -> CommandSubmitter {
        self.aggregator.submitter()
    }

    /// Stop flag shared with every worker. Setting it ends
    /// [`run`](Orchestrator::run) at the next poll.
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Drain everything queued right now and dispatch it in arrival order.
    ///
    /// A quit command ends the drain; commands queued behind it are never
    /// dispatched.
    pub fn drain_once(&self) -> DispatchOutcome {
        for command in self.aggregator.drain() {
            debug!(seq = command.seq, source = ?command.source, "dispatching");
            if self.router.dispatch_line(&command.text) == DispatchOutcome::Quit {
                return DispatchOutcome::Quit;
            }
        }
        DispatchOutcome::Continue
    }

    /// Run the command loop until a quit command arrives or the stop flag
    /// is set, then shut down.
    pub fn run(self) {
        info!("command loop running");

        loop {
            if self.stop.load(Ordering::SeqCst) {
                debug!("stop flag set; leaving command loop");
                break;
            }
            if self.drain_once() == DispatchOutcome::Quit {
                break;
            }
            thread::sleep(self.config.poll_interval());
        }

        self.shutdown();
    }

    /// Tear the workers down in order: stop flag, reminder cancellation,
    /// speech sentinel, grace pause, joins.
    pub fn shutdown(mut self) {
        info!("shutting down");
        self.stop.store(true, Ordering::SeqCst);

        self.scheduler.cancel_all();
        self.speech.handle().shutdown();

        // Queued feedback (goodbye, cancellation notices) drains during
        // the grace pause; the sentinel then ends the worker.
        thread::sleep(self.config.grace_period());
        self.speech.join();

        if let Some(listener) = self.listener.take() {
            if listener.is_finished() {
                let _ = listener.join();
            } else {
                // The recognizer may block in a capture call with no way
                // to interrupt it. The thread observes the stop flag on
                // its next utterance, so it is left detached.
                warn!("listener still blocked in recognition; detaching");
            }
        }

        info!("shutdown complete");
    }
}
