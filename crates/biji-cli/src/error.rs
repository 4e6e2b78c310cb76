use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] biji_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Note name cannot be empty")]
    EmptyNoteName,
    #[error("Edited note content cannot be empty")]
    EmptyEditedContent,
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Sync is not configured. Run `biji sync register --server <URL>` or `biji sync link <CODE> --server <URL>`."
    )]
    SyncNotConfigured,
    #[error("This device already has a sync code. Pass --force to replace it.")]
    AlreadyRegistered,
}
