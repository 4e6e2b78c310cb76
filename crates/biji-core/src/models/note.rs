//! Note model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

/// A unique identifier for a note, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// A note in the system
///
/// Field names on the wire are fixed; both the local document and the relay's
/// account documents use this exact shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Display name, trimmed
    pub name: String,
    /// Note body
    pub content: String,
    /// Completion flag
    #[serde(default)]
    pub done: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
    /// Mutation counter, only used to break reconciliation ties
    #[serde(default)]
    pub revision: u64,
    /// When this note last went through the relay
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

impl Note {
    /// Create a new note; `name` is trimmed
    #[must_use]
    pub fn new(name: &str, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::new(),
            name: name.trim().to_string(),
            content: content.into(),
            done: false,
            created_at: now,
            modified_at: now,
            revision: 0,
            last_sync: None,
        }
    }

    /// Record a mutation: `modified_at` strictly advances and `revision` is bumped
    pub fn touch(&mut self) {
        self.modified_at = next_timestamp(self.modified_at);
        self.revision = self.revision.saturating_add(1);
    }

    /// Whether this copy should replace `other` under last-writer-wins
    #[must_use]
    pub fn supersedes(&self, other: &Self) -> bool {
        match self.modified_at.cmp(&other.modified_at) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.revision > other.revision,
        }
    }
}

impl Note {
    /// Check a note that arrived from outside the store
    ///
    /// The name must be non-blank and `modified_at` may not precede `created_at`.
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::MalformedInput(format!("note {} has a blank name", self.id)));
        }
        if self.modified_at < self.created_at {
            return Err(Error::MalformedInput(format!(
                "note {} was modified before it was created",
                self.id
            )));
        }
        Ok(())
    }
}

/// Sort notes most recently modified first
pub fn sort_by_modified_desc(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
}

/// `now`, nudged forward when the clock has not moved past `previous`
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
