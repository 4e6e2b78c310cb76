//! Data models for biji

mod note;

pub use note::{sort_by_modified_desc, Note, NoteId};
