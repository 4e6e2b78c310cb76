use std::path::Path;

use crate::commands::common::{normalize_note_name, open_store, resolve_note_content};
use crate::error::CliError;

pub fn run_new(name: &str, content_parts: &[String], data_file: &Path) -> Result<(), CliError> {
    let name = normalize_note_name(name)?;
    let content = resolve_note_content(content_parts)?.unwrap_or_default();

    let store = open_store(data_file)?;
    let note = store.create(&name, &content)?;

    println!("{}", note.name);
    Ok(())
}
