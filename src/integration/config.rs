//! Runtime configuration
//!
//! Loaded from a TOML file when one is given, with defaults matching the
//! assistant's stock behavior otherwise.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::notes::NoteStore;
use crate::{GoferError, Result};

fn default_poll_interval_ms() -> u64 {
    300
}

fn default_speech_wait_ms() -> u64 {
    500
}

fn default_grace_period_ms() -> u64 {
    300
}

/// Configuration for the whole assistant.
#[derive(Debug, Clone, Deserialize)]
pub struct GoferConfig {
    /// How often the command loop drains the input queue, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long the speech worker blocks on its queue before re-checking
    /// the stop flag, in milliseconds.
    #[serde(default = "default_speech_wait_ms")]
    pub speech_wait_ms: u64,

    /// Pause between requesting shutdown and tearing workers down, in
    /// milliseconds.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// Where notes are stored. Defaults to `GoferNotes` in the home
    /// directory.
    #[serde(default)]
    pub notes_dir: Option<PathBuf>,
}

impl Default for GoferConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            speech_wait_ms: default_speech_wait_ms(),
            grace_period_ms: default_grace_period_ms(),
            notes_dir: None,
        }
    }
}

impl GoferConfig {
    /// Load a configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GoferError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config: GoferConfig = toml::from_str(&content).map_err(|e| {
            GoferError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Conventional config file location, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gofer").join("config.toml"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(GoferError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.speech_wait_ms == 0 {
            return Err(GoferError::Config(
                "speech_wait_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn speech_wait(&self) -> Duration {
        Duration::from_millis(self.speech_wait_ms)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    /// Notes directory, falling back to the stock location.
    pub fn notes_dir(&self) -> PathBuf {
        self.notes_dir
            .clone()
            .unwrap_or_else(NoteStore::default_dir)
    }
}
