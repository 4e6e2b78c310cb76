use biji_core::Note;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side replica of one user's notes, persisted as `<syncCode>.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub sync_code: String,
    #[serde(default)]
    pub notes: Vec<Note>,
    pub created_at: DateTime<Utc>,
    pub last_sync: DateTime<Utc>,
}

impl Account {
    pub fn new(sync_code: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            sync_code: sync_code.into(),
            notes: Vec::new(),
            created_at: now,
            last_sync: now,
        }
    }

    pub fn document_name(sync_code: &str) -> String {
        format!("{sync_code}.json")
    }
}
