use std::path::Path;

use crate::commands::common::{
    capture_editor_input_with_initial, open_store, resolve_note_content, resolve_note_id,
};
use crate::error::CliError;

pub fn run_edit(name: &str, content_parts: &[String], data_file: &Path) -> Result<(), CliError> {
    let store = open_store(data_file)?;
    let id = resolve_note_id(&store, name)?;

    let content = match resolve_note_content(content_parts)? {
        Some(content) => content,
        None => {
            let note = store.get(&id)?;
            capture_editor_input_with_initial(&note.content)?
                .ok_or(CliError::EmptyEditedContent)?
        }
    };

    let updated = store.update_content(&id, &content)?;
    println!("{}", updated.name);
    Ok(())
}
