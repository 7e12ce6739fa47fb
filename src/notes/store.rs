//! Timestamped note files
//!
//! Notes are plain `.txt` files in one directory, named
//! `"<title> - <YYYYmmdd_HHMMSS>.txt"`. Nothing is read back at startup;
//! the directory itself is the storage.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use crate::Result;

/// Characters stripped from titles before they become file names.
const FORBIDDEN: &[char] = &['\\', '/', ':', '"', '*', '?', '<', '>', '|'];

/// Maximum length of the title part of a note file name.
const MAX_TITLE_LEN: usize = 200;

/// A note that was just written.
#[derive(Debug, Clone)]
pub struct SavedNote {
    pub title: String,
    pub path: PathBuf,
}

/// Strip forbidden characters and collapse whitespace.
fn sanitize_title(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| !FORBIDDEN.contains(c)).collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_TITLE_LEN).collect()
}

pub struct NoteStore {
    dir: PathBuf,
}

impl NoteStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Default notes directory, `~/GoferNotes`.
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("GoferNotes")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a note and return its title and path.
    ///
    /// Without an explicit title, the first line of the content (up to 30
    /// characters) becomes the title. The directory is created on demand.
    pub fn write(&self, title: Option<&str>, content: &str) -> Result<SavedNote> {
        fs::create_dir_all(&self.dir)?;

        let title = match title {
            Some(t) => sanitize_title(t),
            None => {
                let preview: String = content
                    .trim()
                    .lines()
                    .next()
                    .unwrap_or("")
                    .chars()
                    .take(30)
                    .collect();
                sanitize_title(&preview)
            }
        };
        let title = if title.is_empty() { "note".to_string() } else { title };

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self.dir.join(format!("{} - {}.txt", title, timestamp));
        fs::write(&path, content)?;
        debug!("Note written to {}", path.display());

        Ok(SavedNote { title, path })
    }

    /// All note files, reverse-lexicographic by file name. With the
    /// timestamped naming scheme that puts the newest note of a title
    /// first.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut notes: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().map_or(false, |ext| ext == "txt"))
            .collect();
        notes.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
        Ok(notes)
    }

    /// First note whose file name contains `query`, case-insensitive.
    pub fn find(&self, query: &str) -> Result<Option<PathBuf>> {
        let query = query.trim().to_lowercase();
        let found = self.list()?.into_iter().find(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().to_lowercase().contains(&query))
                .unwrap_or(false)
        });
        Ok(found)
    }
}
