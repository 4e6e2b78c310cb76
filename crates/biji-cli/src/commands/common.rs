use std::env;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use biji_core::{Note, NoteId, NoteStore};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CliError;

const DATA_FILE_ENV: &str = "BIJI_DATA_FILE";

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub name: String,
    pub preview: String,
    pub done: bool,
    pub created_at: String,
    pub modified_at: String,
    pub relative_time: String,
}

pub fn open_store(data_file: &Path) -> Result<NoteStore, CliError> {
    Ok(NoteStore::open(data_file)?)
}

/// Resolve a user-supplied note name to its id
pub fn resolve_note_id(store: &NoteStore, name: &str) -> Result<NoteId, CliError> {
    let name = normalize_note_name(name)?;
    Ok(store.find_id_by_name(&name)?)
}

pub fn normalize_note_name(name: &str) -> Result<String, CliError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteName)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn format_note_lines(notes: &[Note], now: DateTime<Utc>) -> Vec<String> {
    let name_width = notes
        .iter()
        .map(|note| note.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);

    notes
        .iter()
        .map(|note| {
            let marker = if note.done { "[x]" } else { "[ ]" };
            let preview = note_preview(note, 40);
            let relative_time = format_relative_time(note.modified_at, now);
            format!(
                "{marker} {:<name_width$}  {preview:<40}  {relative_time}",
                note.name
            )
        })
        .collect()
}

pub fn note_to_list_item(note: &Note, now: DateTime<Utc>) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        name: note.name.clone(),
        preview: note_preview(note, 80),
        done: note.done,
        created_at: note.created_at.to_rfc3339(),
        modified_at: note.modified_at.to_rfc3339(),
        relative_time: format_relative_time(note.modified_at, now),
    }
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - timestamp).num_milliseconds().max(0);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Content from arguments (with literal `\n` expanded), or from stdin when it is piped
pub fn resolve_note_content(content_parts: &[String]) -> Result<Option<String>, CliError> {
    if !content_parts.is_empty() {
        let typed = content_parts.join(" ").replace("\\n", "\n");
        return Ok(Some(normalize_content(&typed)));
    }
    Ok(read_piped_stdin()?.map(|content| normalize_content(&content)))
}

pub fn normalize_content(content: &str) -> String {
    content.trim().to_string()
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(Some(buffer))
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let mut temp_file = tempfile::Builder::new()
        .prefix("biji-note-")
        .suffix(".md")
        .tempfile()?;
    temp_file.write_all(initial_content.as_bytes())?;
    temp_file.flush()?;

    launch_editor(&editor, temp_file.path())?;
    let note_content = std::fs::read_to_string(temp_file.path())?;

    let note_content = normalize_content(&note_content);
    if note_content.is_empty() {
        Ok(None)
    } else {
        Ok(Some(note_content))
    }
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let status = Command::new(program).args(parts).arg(file_path).status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn resolve_data_file(cli_data_file: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_data_file.or_else(|| env::var_os(DATA_FILE_ENV).map(PathBuf::from)) {
        return Ok(path);
    }
    Ok(biji_core::store::default_data_file()?)
}
