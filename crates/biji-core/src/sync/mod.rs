//! Relay sync protocol: wire types, reconciliation policy, and HTTP client.

mod client;
mod wire;

use std::collections::HashMap;

use crate::error::Result;
use crate::models::{sort_by_modified_desc, Note, NoteId};

pub use client::SyncClient;
pub use wire::{NotesResponse, RegisterResponse, SyncRequest, SyncResponse, SYNC_CODE_HEADER};

/// Result of folding an incoming note set into an existing one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Resulting notes, most recently modified first
    pub notes: Vec<Note>,
    /// Incoming notes that were unknown and got added
    pub added: usize,
    /// Incoming notes that replaced an older copy
    pub accepted: usize,
    /// Incoming notes discarded because the existing copy won
    pub retained: usize,
}

impl Reconciled {
    pub const fn changed(&self) -> bool {
        self.added > 0 || self.accepted > 0
    }
}

/// Reject an incoming note set if any note breaks the model invariants
pub fn validate_incoming(incoming: &[Note]) -> Result<()> {
    incoming.iter().try_for_each(Note::validate)
}

/// Last-writer-wins per note.
///
/// A note present on both sides keeps whichever copy has the later
/// `modified_at`, then the higher `revision`; on a full tie the existing copy
/// stays. Incoming notes with unknown ids are added. Existing notes absent
/// from `incoming` are kept, so deletions do not propagate.
pub fn reconcile(existing: &[Note], incoming: Vec<Note>) -> Reconciled {
    let mut notes = existing.to_vec();
    let mut index: HashMap<NoteId, usize> = notes
        .iter()
        .enumerate()
        .map(|(position, note)| (note.id, position))
        .collect();

    let mut outcome = Reconciled::default();
    for note in incoming {
        match index.get(&note.id) {
            Some(&position) if note.supersedes(&notes[position]) => {
                notes[position] = note;
                outcome.accepted += 1;
            }
            Some(_) => outcome.retained += 1,
            None => {
                index.insert(note.id, notes.len());
                notes.push(note);
                outcome.added += 1;
            }
        }
    }

    sort_by_modified_desc(&mut notes);
    outcome.notes = notes;
    outcome
}
