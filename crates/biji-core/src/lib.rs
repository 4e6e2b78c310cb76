//! biji-core - Core library for biji
//!
//! This crate contains the note model, the JSON-backed note store, and the
//! relay sync protocol shared by the CLI and the relay server.

pub mod error;
pub mod models;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
pub use models::{Note, NoteId};
pub use store::NoteStore;
