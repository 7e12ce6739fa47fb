//! Background speech listener
//!
//! Wraps a blocking [`SpeechRecognizer`] in a thread that pushes recognized
//! utterances into the input aggregator. The stop flag is observed between
//! utterances, so the thread ends cooperatively after the current
//! recognition call returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, info};

use crate::input::aggregator::{CommandSource, CommandSubmitter};
use crate::journal::SharedJournal;
use crate::speech::SpeechHandle;

/// Why a recognition attempt produced no text.
#[derive(Debug, Clone)]
pub enum RecognizeError {
    /// Audio was captured but nothing intelligible came out
    Unintelligible,

    /// The recognition service itself failed
    ServiceUnavailable(String),
}

/// Blocking speech-to-text provider.
///
/// `recognize` captures one utterance and blocks until something is heard
/// or the attempt fails.
pub trait SpeechRecognizer: Send {
    fn recognize(&mut self) -> std::result::Result<String, RecognizeError>;
}

/// Spawn the listener thread.
///
/// Runs until the stop flag is set or the recognition service reports
/// itself unavailable. Unintelligible utterances are journaled and skipped;
/// a dead service ends listening for the session while typed input keeps
/// working.
pub fn spawn_listener(
    mut recognizer: Box<dyn SpeechRecognizer>,
    submitter: CommandSubmitter,
    journal: SharedJournal,
    speech: SpeechHandle,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        info!("Speech listener started");
        journal.log("Listening in background...");
        speech.speak("Gofer is now listening.");

        while !stop.load(Ordering::SeqCst) {
            match recognizer.recognize() {
                Ok(text) => {
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    journal.log(&format!("Heard: {}", text));
                    submitter.submit(text, CommandSource::Recognized);
                }
                Err(RecognizeError::Unintelligible) => {
                    journal.log("Could not understand audio.");
                }
                Err(RecognizeError::ServiceUnavailable(e)) => {
                    error!("Recognition service unavailable: {}", e);
                    journal.log(&format!("Recognition service error: {}", e));
                    speech.speak("Speech recognition service error.");
                    break;
                }
            }
        }

        journal.log("Listener stopped.");
        info!("Speech listener stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::aggregator::InputAggregator;
    use crate::journal::{Journal, MemoryJournal};
    use crate::speech::output::SpeechOutput;
    use crate::speech::Synthesizer;
    use std::sync::Arc;
    use std::time::Duration;

    struct ScriptedRecognizer {
        script: Vec<std::result::Result<String, RecognizeError>>,
    }

    impl SpeechRecognizer for ScriptedRecognizer {
        fn recognize(&mut self) -> std::result::Result<String, RecognizeError> {
            if self.script.is_empty() {
                // Script exhausted: behave like a dead service so the
                // listener thread ends instead of spinning.
                return Err(RecognizeError::ServiceUnavailable("script done".into()));
            }
            self.script.remove(0)
        }
    }

    struct SilentSynthesizer;

    impl Synthesizer for SilentSynthesizer {
        fn speak(&mut self, _text: &str) -> crate::Result<()> {
            Ok(())
        }
    }

    fn speech_fixture(
        journal: SharedJournal,
        stop: Arc<AtomicBool>,
    ) -> (SpeechOutput, SpeechHandle) {
        let output = SpeechOutput::start(
            || Ok(Box::new(SilentSynthesizer) as Box<dyn Synthesizer>),
            journal,
            stop,
            Duration::from_millis(20),
        );
        let handle = output.handle();
        (output, handle)
    }

    #[test]
    fn test_recognized_text_reaches_the_aggregator() {
        let aggregator = InputAggregator::new();
        let journal = MemoryJournal::new();
        let shared: SharedJournal = Arc::new(journal.clone());
        let stop = Arc::new(AtomicBool::new(false));
        let (mut speech, handle) = speech_fixture(shared.clone(), stop.clone());

        let recognizer = Box::new(ScriptedRecognizer {
            script: vec![
                Ok("open notepad".to_string()),
                Err(RecognizeError::Unintelligible),
                Ok("  time  ".to_string()),
            ],
        });

        let worker = spawn_listener(recognizer, aggregator.submitter(), shared, handle, stop.clone());
        worker.join().unwrap();

        let drained = aggregator.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].text, "open notepad");
        assert_eq!(drained[0].source, CommandSource::Recognized);
        assert_eq!(drained[1].text, "time");

        assert!(journal.contains("Heard: open notepad"));
        assert!(journal.contains("Could not understand audio."));
        assert!(journal.contains("Listener stopped."));

        stop.store(true, Ordering::SeqCst);
        speech.join();
    }

    #[test]
    fn test_dead_service_ends_the_listener() {
        let aggregator = InputAggregator::new();
        let journal = MemoryJournal::new();
        let shared: SharedJournal = Arc::new(journal.clone());
        let stop = Arc::new(AtomicBool::new(false));
        let (mut speech, handle) = speech_fixture(shared.clone(), stop.clone());

        let recognizer = Box::new(ScriptedRecognizer {
            script: vec![Err(RecognizeError::ServiceUnavailable("api down".into()))],
        });

        let worker = spawn_listener(recognizer, aggregator.submitter(), shared, handle, stop.clone());
        worker.join().unwrap();

        assert!(aggregator.drain().is_empty());
        assert!(journal.contains("Recognition service error: api down"));

        stop.store(true, Ordering::SeqCst);
        speech.join();
    }

    #[test]
    fn test_stop_flag_prevents_further_recognition() {
        let aggregator = InputAggregator::new();
        let journal = MemoryJournal::new();
        let shared: SharedJournal = Arc::new(journal.clone());
        let stop = Arc::new(AtomicBool::new(true));
        let (mut speech, handle) = speech_fixture(shared.clone(), stop.clone());

        // Would submit text if the loop body ever ran
        let recognizer = Box::new(ScriptedRecognizer {
            script: vec![Ok("should not appear".to_string())],
        });

        let worker = spawn_listener(recognizer, aggregator.submitter(), shared, handle, stop);
        worker.join().unwrap();

        assert!(aggregator.drain().is_empty());
        assert!(journal.contains("Listener stopped."));
        speech.join();
    }
}
