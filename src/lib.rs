pub mod command;
pub mod input;
pub mod integration;
pub mod journal;
pub mod launch;
pub mod notes;
pub mod reminder;
pub mod speech;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum GoferError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Scheduling error: {0}")]
    Scheduling(String),

    #[error("Resolution exhausted for target: {0}")]
    ResolutionExhausted(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Speech engine error: {0}")]
    SpeechEngine(String),

    #[error("Launch failed: {0}")]
    LaunchFailed(String),

    #[error("No handler registered for: {0}")]
    NoHandler(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Channel error: {0}")]
    Channel(String),
}

impl From<std::io::Error> for GoferError {
    fn from(e: std::io::Error) -> Self {
        GoferError::Io(e.to_string())
    }
}

impl GoferError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // A bad command only affects itself
            GoferError::Parse(_) => true,
            GoferError::Scheduling(_) => true,
            // The target could not be opened, nothing else is affected
            GoferError::ResolutionExhausted(_) => true,
            GoferError::LaunchFailed(_) => true,
            GoferError::NoHandler(_) => true,
            GoferError::Browser(_) => true,
            // A dead collaborator disables its feature for the session
            GoferError::ServiceUnavailable(_) => false,
            GoferError::SpeechEngine(_) => true,
            GoferError::Config(_) => false,
            GoferError::Io(_) => false,
            GoferError::Channel(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            GoferError::Parse(_) => {
                "Sorry, I didn't understand that command.".to_string()
            }
            GoferError::Scheduling(_) => {
                "I can't set a reminder in the past.".to_string()
            }
            GoferError::ResolutionExhausted(target) => {
                format!("Sorry, I couldn't open {}.", target)
            }
            GoferError::ServiceUnavailable(_) => {
                "A background service is unavailable. That feature is disabled.".to_string()
            }
            GoferError::SpeechEngine(_) => {
                "Speech output failed. Status will be shown as text.".to_string()
            }
            GoferError::LaunchFailed(target) => {
                format!("I couldn't start {}.", target)
            }
            GoferError::NoHandler(target) => {
                format!("Nothing is registered to open {}.", target)
            }
            GoferError::Browser(_) => {
                "I couldn't open the browser.".to_string()
            }
            GoferError::Config(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            GoferError::Io(_) => {
                "File system error occurred.".to_string()
            }
            GoferError::Channel(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, GoferError>;
