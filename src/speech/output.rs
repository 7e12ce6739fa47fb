//! Speech output serializer
//!
//! One worker thread owns the synthesizer and plays queued utterances in
//! strict FIFO order, one at a time. `speak` never blocks the caller. The
//! worker waits with a bounded timeout so it notices the stop flag, and a
//! [`SpeechRequest::Shutdown`] sentinel ends consumption immediately. If
//! the synthesizer fails to construct, the worker degrades to draining and
//! discarding requests so producers keep working.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error, info, warn};

use crate::journal::SharedJournal;
use crate::speech::synthesizer::Synthesizer;

/// One queued unit of spoken output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechRequest {
    /// Play this utterance
    Say(String),

    /// Stop consuming and release the device
    Shutdown,
}

/// Producer handle for spoken output. Cheap to clone.
#[derive(Clone)]
pub struct SpeechHandle {
    request_tx: Sender<SpeechRequest>,
}

impl SpeechHandle {
    /// Enqueue an utterance and return immediately.
    ///
    /// Empty text is ignored. Sends after the worker is gone are dropped
    /// silently; that only happens during shutdown.
    pub fn speak(&self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        let _ = self.request_tx.send(SpeechRequest::Say(text));
    }

    /// Enqueue the shutdown sentinel.
    pub fn shutdown(&self) {
        let _ = self.request_tx.send(SpeechRequest::Shutdown);
    }
}

/// Factory for the worker's synthesizer, run on the worker thread.
pub type SynthesizerFactory =
    Box<dyn FnOnce() -> crate::Result<Box<dyn Synthesizer>> + Send + 'static>;

/// The speech output worker and its producer handle.
pub struct SpeechOutput {
    handle: SpeechHandle,
    worker: Option<JoinHandle<()>>,
}

impl SpeechOutput {
    /// Start the worker thread.
    ///
    /// `wait` bounds how long the worker blocks on the queue before
    /// re-checking the stop flag.
    pub fn start<F>(
        factory: F,
        journal: SharedJournal,
        stop: Arc<AtomicBool>,
        wait: Duration,
    ) -> Self
    where
        F: FnOnce() -> crate::Result<Box<dyn Synthesizer>> + Send + 'static,
    {
        let (request_tx, request_rx) = unbounded();
        let worker = thread::spawn(move || run_worker(factory, request_rx, journal, stop, wait));

        Self {
            handle: SpeechHandle { request_tx },
            worker: Some(worker),
        }
    }

    /// Get a producer handle.
    pub fn handle(&self) -> SpeechHandle {
        self.handle.clone()
    }

    /// Wait for the worker to finish. Call after the stop flag is set or
    /// the sentinel was enqueued.
    pub fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker<F>(
    factory: F,
    request_rx: Receiver<SpeechRequest>,
    journal: SharedJournal,
    stop: Arc<AtomicBool>,
    wait: Duration,
) where
    F: FnOnce() -> crate::Result<Box<dyn Synthesizer>>,
{
    info!("Speech worker starting");

    // A failed engine leaves a draining consumer so producers never block
    let mut synthesizer = match factory() {
        Ok(synth) => Some(synth),
        Err(e) => {
            error!("Failed to initialize speech synthesizer: {}", e);
            journal.log(&format!("Speech output unavailable: {}", e));
            None
        }
    };

    loop {
        if stop.load(Ordering::SeqCst) {
            break;
        }

        match request_rx.recv_timeout(wait) {
            Ok(SpeechRequest::Say(text)) => {
                if let Some(synth) = synthesizer.as_mut() {
                    debug!("Speaking: {}", text);
                    if let Err(e) = synth.speak(&text) {
                        warn!("Utterance playback failed: {}", e);
                        journal.log(&format!("Speech output failed: {}", e));
                    }
                }
            }
            Ok(SpeechRequest::Shutdown) => {
                info!("Speech worker shutting down");
                break;
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    info!("Speech worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::MemoryJournal;
    use crate::GoferError;
    use parking_lot::Mutex;
    use std::time::Instant;

    /// Records what was spoken and when each playback started and ended.
    #[derive(Clone)]
    struct RecordingSynthesizer {
        spoken: Arc<Mutex<Vec<String>>>,
        spans: Arc<Mutex<Vec<(Instant, Instant)>>>,
        per_utterance: Duration,
    }

    impl RecordingSynthesizer {
        fn new(per_utterance: Duration) -> Self {
            Self {
                spoken: Arc::new(Mutex::new(Vec::new())),
                spans: Arc::new(Mutex::new(Vec::new())),
                per_utterance,
            }
        }
    }

    impl Synthesizer for RecordingSynthesizer {
        fn speak(&mut self, text: &str) -> crate::Result<()> {
            let start = Instant::now();
            thread::sleep(self.per_utterance);
            self.spoken.lock().push(text.to_string());
            self.spans.lock().push((start, Instant::now()));
            Ok(())
        }
    }

    struct FailingSynthesizer;

    impl Synthesizer for FailingSynthesizer {
        fn speak(&mut self, _text: &str) -> crate::Result<()> {
            Err(GoferError::SpeechEngine("no voice".into()))
        }
    }

    fn shared(journal: &MemoryJournal) -> SharedJournal {
        Arc::new(journal.clone())
    }

    #[test]
    fn test_requests_play_in_fifo_order_without_overlap() {
        let journal = MemoryJournal::new();
        let stop = Arc::new(AtomicBool::new(false));
        let synth = RecordingSynthesizer::new(Duration::from_millis(30));
        let spoken = synth.spoken.clone();
        let spans = synth.spans.clone();

        let mut output = SpeechOutput::start(
            move || Ok(Box::new(synth) as Box<dyn Synthesizer>),
            shared(&journal),
            stop,
            Duration::from_millis(20),
        );
        let handle = output.handle();

        handle.speak("one");
        handle.speak("two");
        handle.speak("three");
        handle.shutdown();
        output.join();

        assert_eq!(*spoken.lock(), vec!["one", "two", "three"]);

        let spans = spans.lock();
        assert_eq!(spans.len(), 3);
        // Each playback ends before the next begins
        assert!(spans[0].1 <= spans[1].0);
        assert!(spans[1].1 <= spans[2].0);
    }

    #[test]
    fn test_speak_does_not_block_the_caller() {
        let journal = MemoryJournal::new();
        let stop = Arc::new(AtomicBool::new(false));
        let synth = RecordingSynthesizer::new(Duration::from_millis(80));

        let mut output = SpeechOutput::start(
            move || Ok(Box::new(synth) as Box<dyn Synthesizer>),
            shared(&journal),
            stop,
            Duration::from_millis(20),
        );
        let handle = output.handle();

        let begin = Instant::now();
        for _ in 0..10 {
            handle.speak("slow utterance");
        }
        // Ten 80ms utterances enqueued nearly instantly
        assert!(begin.elapsed() < Duration::from_millis(50));

        handle.shutdown();
        output.join();
    }

    #[test]
    fn test_shutdown_sentinel_stops_consumption() {
        let journal = MemoryJournal::new();
        let stop = Arc::new(AtomicBool::new(false));
        let synth = RecordingSynthesizer::new(Duration::from_millis(1));
        let spoken = synth.spoken.clone();

        let mut output = SpeechOutput::start(
            move || Ok(Box::new(synth) as Box<dyn Synthesizer>),
            shared(&journal),
            stop,
            Duration::from_millis(20),
        );
        let handle = output.handle();

        handle.speak("before");
        handle.shutdown();
        handle.speak("after");
        output.join();

        assert_eq!(*spoken.lock(), vec!["before"]);
    }

    #[test]
    fn test_stop_flag_ends_an_idle_worker() {
        let journal = MemoryJournal::new();
        let stop = Arc::new(AtomicBool::new(false));
        let synth = RecordingSynthesizer::new(Duration::from_millis(1));

        let mut output = SpeechOutput::start(
            move || Ok(Box::new(synth) as Box<dyn Synthesizer>),
            shared(&journal),
            stop.clone(),
            Duration::from_millis(10),
        );

        stop.store(true, Ordering::SeqCst);
        // The worker notices within one wait interval
        output.join();
    }

    #[test]
    fn test_degraded_mode_drains_without_an_engine() {
        let journal = MemoryJournal::new();
        let stop = Arc::new(AtomicBool::new(false));

        let mut output = SpeechOutput::start(
            || Err(GoferError::ServiceUnavailable("no device".into())),
            shared(&journal),
            stop,
            Duration::from_millis(20),
        );
        let handle = output.handle();

        // Producers keep working; requests are discarded
        for _ in 0..100 {
            handle.speak("into the void");
        }
        handle.shutdown();
        output.join();

        assert!(journal.contains("Speech output unavailable"));
    }

    #[test]
    fn test_playback_failure_is_journaled_and_consumption_continues() {
        let journal = MemoryJournal::new();
        let stop = Arc::new(AtomicBool::new(false));

        let mut output = SpeechOutput::start(
            || Ok(Box::new(FailingSynthesizer) as Box<dyn Synthesizer>),
            shared(&journal),
            stop,
            Duration::from_millis(20),
        );
        let handle = output.handle();

        handle.speak("first");
        handle.speak("second");
        handle.shutdown();
        output.join();

        let failures = journal
            .lines()
            .iter()
            .filter(|l| l.contains("Speech output failed"))
            .count();
        assert_eq!(failures, 2);
    }

    #[test]
    fn test_empty_text_is_ignored() {
        let journal = MemoryJournal::new();
        let stop = Arc::new(AtomicBool::new(false));
        let synth = RecordingSynthesizer::new(Duration::from_millis(1));
        let spoken = synth.spoken.clone();

        let mut output = SpeechOutput::start(
            move || Ok(Box::new(synth) as Box<dyn Synthesizer>),
            shared(&journal),
            stop,
            Duration::from_millis(20),
        );
        let handle = output.handle();

        handle.speak("");
        handle.speak("real");
        handle.shutdown();
        output.join();

        assert_eq!(*spoken.lock(), vec!["real"]);
    }
}
