//! Configuration and end-to-end wiring for the assistant

pub mod config;
pub mod orchestrator;

pub use config::GoferConfig;
pub use orchestrator::Orchestrator;
