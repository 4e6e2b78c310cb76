//! Local note storage

mod document;
mod note_store;

use std::path::PathBuf;

use crate::error::{Error, Result};

pub use document::{read_json, write_json_atomic, Layout};
pub use note_store::NoteStore;

const APP_DIR_NAME: &str = "biji";
const DATA_FILE_NAME: &str = "biji.json";

/// Per-user configuration directory for biji (e.g. `~/.config/biji`)
pub fn default_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| Error::NotFound("user configuration directory".into()))
}

/// Default location of the local note document
pub fn default_data_file() -> Result<PathBuf> {
    Ok(default_config_dir()?.join(DATA_FILE_NAME))
}
