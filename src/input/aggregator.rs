//! Merged command intake
//!
//! Typed submissions and recognized speech land in one queue. The
//! orchestrator's polling loop drains it with [`InputAggregator::drain`],
//! which never blocks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use tracing::trace;

/// Where a command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    /// Typed into the terminal or submitted programmatically
    Typed,

    /// Produced by the speech recognizer
    Recognized,
}

/// One raw command line awaiting dispatch.
///
/// Immutable once created; the router consumes it exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Raw text as submitted
    pub text: String,

    /// Which producer submitted it
    pub source: CommandSource,

    /// Arrival order across both producers
    pub seq: u64,
}

/// Producer side of the aggregator. Cheap to clone; one clone per producer.
#[derive(Clone)]
pub struct CommandSubmitter {
    tx: Sender<Command>,
    next_seq: Arc<AtomicU64>,
}

impl CommandSubmitter {
    /// Enqueue a command. Never blocks.
    ///
    /// Submissions after the consumer is gone are dropped silently; that
    /// only happens during shutdown.
    pub fn submit(&self, text: impl Into<String>, source: CommandSource) {
        let command = Command {
            text: text.into(),
            source,
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
        };
        trace!(seq = command.seq, ?source, "command submitted");
        let _ = self.tx.send(command);
    }
}

/// Merges typed and recognized submissions into one ordered stream.
pub struct InputAggregator {
    rx: Receiver<Command>,
    submitter: CommandSubmitter,
}

impl InputAggregator {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            rx,
            submitter: CommandSubmitter {
                tx,
                next_seq: Arc::new(AtomicU64::new(0)),
            },
        }
    }

    /// Get a producer handle.
    pub fn submitter(&self) -> CommandSubmitter {
        self.submitter.clone()
    }

    /// Drain everything currently queued, in arrival order.
    ///
    /// Returns immediately with an empty vec when nothing is pending.
    pub fn drain(&self) -> Vec<Command> {
        let mut drained = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(command) => drained.push(command),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        drained
    }
}

impl Default for InputAggregator {
    fn default() -> Self {
        Self::new()
    }
}
