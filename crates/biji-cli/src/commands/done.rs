use std::path::Path;

use crate::commands::common::{open_store, resolve_note_id};
use crate::error::CliError;

pub fn run_set_done(name: &str, done: bool, data_file: &Path) -> Result<(), CliError> {
    let store = open_store(data_file)?;
    let id = resolve_note_id(&store, name)?;

    let note = store.set_done(&id, done)?;
    let marker = if note.done { "[x]" } else { "[ ]" };
    println!("{marker} {}", note.name);
    Ok(())
}
