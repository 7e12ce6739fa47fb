//! OS launch primitives
//!
//! The resolution engine never talks to the operating system directly; it
//! goes through [`Desktop`] so the fallback chain can be exercised in tests
//! without spawning anything.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::{GoferError, Result};

/// Operations the launch engine needs from the host system.
///
/// Every method is fire-and-forget: success means the OS accepted the
/// request, not that the application came up.
pub trait Desktop: Send + Sync {
    /// Open a URL in the default browser.
    fn open_url(&self, url: &str) -> Result<()>;

    /// Ask the OS to open a target by name (executable, document, URI scheme).
    fn default_open(&self, target: &str) -> Result<()>;

    /// Launch a program directly. Absolute paths are executed as-is; bare
    /// names go through the search path.
    fn launch(&self, path_or_cmd: &str) -> Result<()>;

    /// Hand the literal target string to the OS shell as a last resort.
    fn shell_start(&self, target: &str) -> Result<()>;

    /// Whether a filesystem path exists.
    fn path_exists(&self, path: &str) -> bool;
}

/// [`Desktop`] backed by the real operating system.
#[derive(Debug, Default)]
pub struct SystemDesktop;

impl SystemDesktop {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "windows")]
fn spawn_opener(target: &str) -> std::io::Result<std::process::Child> {
    Command::new("cmd").args(["/C", "start", "", target]).spawn()
}

#[cfg(target_os = "macos")]
fn spawn_opener(target: &str) -> std::io::Result<std::process::Child> {
    Command::new("open").arg(target).spawn()
}

#[cfg(all(unix, not(target_os = "macos")))]
fn spawn_opener(target: &str) -> std::io::Result<std::process::Child> {
    Command::new("xdg-open").arg(target).spawn()
}

impl Desktop for SystemDesktop {
    fn open_url(&self, url: &str) -> Result<()> {
        debug!(url, "opening in default browser");
        spawn_opener(url)
            .map(drop)
            .map_err(|e| GoferError::Browser(e.to_string()))
    }

    fn default_open(&self, target: &str) -> Result<()> {
        debug!(target, "default-open");
        spawn_opener(target)
            .map(drop)
            .map_err(|e| GoferError::NoHandler(e.to_string()))
    }

    fn launch(&self, path_or_cmd: &str) -> Result<()> {
        // Absolute paths run as-is; bare names get the search-path lookup.
        debug!(command = path_or_cmd, "launching");
        Command::new(path_or_cmd)
            .spawn()
            .map(drop)
            .map_err(|e| GoferError::LaunchFailed(e.to_string()))
    }

    #[cfg(target_os = "windows")]
    fn shell_start(&self, target: &str) -> Result<()> {
        debug!(target, "shell start");
        Command::new("cmd")
            .args(["/C", "start", "", target])
            .spawn()
            .map(drop)
            .map_err(|e| GoferError::LaunchFailed(e.to_string()))
    }

    #[cfg(not(target_os = "windows"))]
    fn shell_start(&self, target: &str) -> Result<()> {
        debug!(target, "shell start");
        Command::new("sh")
            .args(["-c", target])
            .spawn()
            .map(drop)
            .map_err(|e| GoferError::LaunchFailed(e.to_string()))
    }

    fn path_exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_exists_checks_the_filesystem() {
        let desktop = SystemDesktop::new();
        assert!(!desktop.path_exists("/definitely/not/a/real/path/anywhere"));

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("present.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(desktop.path_exists(&file.to_string_lossy()));
    }

    #[test]
    fn test_launch_missing_command_fails() {
        let desktop = SystemDesktop::new();
        let result = desktop.launch("gofer-test-no-such-binary-1b3f");
        assert!(matches!(result, Err(GoferError::LaunchFailed(_))));
    }
}
