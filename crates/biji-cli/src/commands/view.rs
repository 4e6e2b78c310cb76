use std::path::Path;

use crate::commands::common::{format_timestamp, open_store, resolve_note_id};
use crate::error::CliError;

pub fn run_view(name: &str, as_json: bool, data_file: &Path) -> Result<(), CliError> {
    let store = open_store(data_file)?;
    let id = resolve_note_id(&store, name)?;
    let note = store.get(&id)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&note)?);
        return Ok(());
    }

    let status = if note.done { "done" } else { "open" };
    println!("# {} ({status})", note.name);
    println!("modified {}", format_timestamp(note.modified_at));
    println!();
    println!("{}", note.content);
    Ok(())
}
