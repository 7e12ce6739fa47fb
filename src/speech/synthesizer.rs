//! Text-to-speech engine seam
//!
//! The serializer drives one [`Synthesizer`] from a single thread. Real
//! engines are often tied to the thread that created them, so construction
//! happens inside the worker via a factory closure; the trait itself does
//! not require `Send`.

use crate::Result;

/// Plays utterances to completion, one at a time.
pub trait Synthesizer {
    /// Play one utterance. Returns when playback is finished.
    fn speak(&mut self, text: &str) -> Result<()>;
}

/// Fallback voice for environments without a speech engine: prints the
/// utterance to stdout.
pub struct ConsoleSynthesizer;

impl Synthesizer for ConsoleSynthesizer {
    fn speak(&mut self, text: &str) -> Result<()> {
        println!("(voice) {}", text);
        Ok(())
    }
}
