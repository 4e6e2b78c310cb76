use std::path::Path;

use crate::commands::common::{normalize_note_name, open_store, resolve_note_id};
use crate::error::CliError;

pub fn run_rename(name: &str, new_name: &str, data_file: &Path) -> Result<(), CliError> {
    let new_name = normalize_note_name(new_name)?;
    let store = open_store(data_file)?;
    let id = resolve_note_id(&store, name)?;

    let note = store.rename(&id, &new_name)?;
    println!("{}", note.name);
    Ok(())
}
