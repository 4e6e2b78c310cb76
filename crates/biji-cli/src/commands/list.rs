use std::path::Path;

use chrono::Utc;

use crate::commands::common::{format_note_lines, note_to_list_item, open_store, NoteListItem};
use crate::error::CliError;

pub fn run_list(limit: Option<usize>, as_json: bool, data_file: &Path) -> Result<(), CliError> {
    let store = open_store(data_file)?;
    let mut notes = store.list();
    if let Some(limit) = limit {
        notes.truncate(limit);
    }

    let now = Utc::now();
    if as_json {
        let json_items = notes
            .iter()
            .map(|note| note_to_list_item(note, now))
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if notes.is_empty() {
        println!("No notes yet. Create one with `biji new <name>`.");
    } else {
        for line in format_note_lines(&notes, now) {
            println!("{line}");
        }
    }

    Ok(())
}
