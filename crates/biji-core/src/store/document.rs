//! Whole-document JSON persistence shared by the note store and the relay

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::Result;

/// Output layout of a persisted document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Compact,
    Pretty,
}

/// Read and parse a JSON document
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read(path)?;
    Ok(serde_json::from_slice(&raw)?)
}

/// Replace the document at `path` with `value`
///
/// The bytes go to a temporary file in the target's directory which is then
/// renamed over the target, so readers see either the old or the new document.
pub fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    layout: Layout,
) -> Result<()> {
    let bytes = match layout {
        Layout::Compact => serde_json::to_vec(value)?,
        Layout::Pretty => serde_json::to_vec_pretty(value)?,
    };

    let dir = parent_dir(path);
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(&bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Document written");
    Ok(())
}

/// Directory a document lives in, `.` for bare file names
pub fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}
