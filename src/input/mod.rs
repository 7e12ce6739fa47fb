//! Command intake: the aggregator queue and the background speech listener

pub mod aggregator;
pub mod listener;

pub use aggregator::{Command, CommandSource, CommandSubmitter, InputAggregator};
pub use listener::{spawn_listener, RecognizeError, SpeechRecognizer};
