//! Spoken output: the synthesizer seam and the FIFO serializer worker

pub mod output;
pub mod synthesizer;

pub use output::{SpeechHandle, SpeechOutput, SpeechRequest, SynthesizerFactory};
pub use synthesizer::{ConsoleSynthesizer, Synthesizer};
