use std::path::Path;

use crate::commands::common::{open_store, resolve_note_id};
use crate::error::CliError;

/// Every name is resolved before anything is deleted
pub fn run_delete(names: &[String], data_file: &Path) -> Result<(), CliError> {
    let store = open_store(data_file)?;
    let ids = names
        .iter()
        .map(|name| resolve_note_id(&store, name).map(|id| (name.trim(), id)))
        .collect::<Result<Vec<_>, _>>()?;

    for (name, id) in ids {
        store.delete(&id)?;
        println!("{name}");
    }
    Ok(())
}
