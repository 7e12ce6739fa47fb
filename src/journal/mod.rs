//! User-visible status journal
//!
//! Every component reports user-facing status through a [`Journal`] rather
//! than printing directly. This keeps diagnostic tracing separate from the
//! text the user is meant to see, and lets tests capture output.

use std::sync::Arc;

use parking_lot::RwLock;

/// Append-only sink for user-visible status lines.
pub trait Journal: Send + Sync {
    /// Append one line to the journal.
    fn log(&self, line: &str);
}

/// Shared, cheaply clonable journal reference.
pub type SharedJournal = Arc<dyn Journal>;

/// Journal that writes lines to stdout.
pub struct ConsoleJournal;

impl Journal for ConsoleJournal {
    fn log(&self, line: &str) {
        println!("{}", line);
    }
}

/// Journal that keeps lines in memory.
///
/// Used by tests to assert on the exact sequence of status lines.
#[derive(Debug, Clone)]
pub struct MemoryJournal {
    lines: Arc<RwLock<Vec<String>>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self {
            lines: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Snapshot of all lines logged so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.read().clone()
    }

    /// Check whether any line contains the given fragment.
    pub fn contains(&self, fragment: &str) -> bool {
        self.lines.read().iter().any(|l| l.contains(fragment))
    }

    pub fn len(&self) -> usize {
        self.lines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.read().is_empty()
    }

    pub fn clear(&self) {
        self.lines.write().clear();
    }
}

impl Journal for MemoryJournal {
    fn log(&self, line: &str) {
        self.lines.write().push(line.to_string());
    }
}

impl Default for MemoryJournal {
    fn default() -> Self {
        Self::new()
    }
}
