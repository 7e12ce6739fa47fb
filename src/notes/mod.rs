//! Note files: write, list, open by name

pub mod store;

pub use store::{NoteStore, SavedNote};
