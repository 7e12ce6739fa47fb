//! Command splitting, parsing, and dispatch

pub mod builtins;
pub mod router;
pub mod splitter;

pub use router::{parse_command, DispatchOutcome, Intent, Router};
pub use splitter::split_commands;
