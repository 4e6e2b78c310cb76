//! JSON-backed note store

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Error, Result};
use crate::models::{sort_by_modified_desc, Note, NoteId};
use crate::sync::{reconcile, validate_incoming, Reconciled};

use super::document::{parent_dir, read_json, write_json_atomic, Layout};

/// Single-account note repository backed by one JSON document.
///
/// The cache and the document only change together: every mutation holds the
/// write lock across the in-memory update and the full rewrite of the file,
/// and a failed write leaves the cache as it was.
#[derive(Debug)]
pub struct NoteStore {
    path: PathBuf,
    notes: RwLock<Vec<Note>>,
}

impl NoteStore {
    /// Open the store at `path`, creating the directory and an empty document if needed
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        fs::create_dir_all(parent_dir(&path))?;

        if !path.exists() {
            write_json_atomic(&path, &Vec::<Note>::new(), Layout::Compact)?;
            tracing::info!(path = %path.display(), "Created empty note document");
        }

        let notes: Vec<Note> = read_json(&path)?;
        tracing::debug!(path = %path.display(), count = notes.len(), "Loaded notes");

        Ok(Self {
            path,
            notes: RwLock::new(notes),
        })
    }

    /// Open the store at the platform default location
    pub fn open_default() -> Result<Self> {
        Self::open(super::default_data_file()?)
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Create a note; fails if another note already has the same trimmed name
    pub fn create(&self, name: &str, content: &str) -> Result<Note> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::MalformedInput("note name cannot be empty".into()));
        }

        let mut notes = self.write();
        if notes.iter().any(|note| note.name == name) {
            return Err(Error::NameConflict(name.to_string()));
        }

        let note = Note::new(name, content);
        let mut next = notes.clone();
        next.push(note.clone());
        self.commit(&mut notes, next)?;

        tracing::info!(id = %note.id, "Created note");
        Ok(note)
    }

    pub fn get(&self, id: &NoteId) -> Result<Note> {
        self.read()
            .iter()
            .find(|note| note.id == *id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// All notes, most recently modified first
    pub fn list(&self) -> Vec<Note> {
        let mut notes = self.read().clone();
        sort_by_modified_desc(&mut notes);
        notes
    }

    /// Note names in `list` order
    pub fn names(&self) -> Vec<String> {
        self.list().into_iter().map(|note| note.name).collect()
    }

    /// Remove a note; deleting an unknown id succeeds without touching the document
    pub fn delete(&self, id: &NoteId) -> Result<()> {
        let mut notes = self.write();
        let Some(index) = notes.iter().position(|note| note.id == *id) else {
            return Ok(());
        };

        let mut next = notes.clone();
        next.remove(index);
        self.commit(&mut notes, next)?;

        tracing::info!(%id, "Deleted note");
        Ok(())
    }

    /// Rename a note. Names are not checked for uniqueness here, only on create.
    pub fn rename(&self, id: &NoteId, new_name: &str) -> Result<Note> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(Error::MalformedInput("note name cannot be empty".into()));
        }

        self.update_with(id, |note| {
            if note.name == new_name {
                return false;
            }
            note.name = new_name.to_string();
            true
        })
    }

    /// Replace a note's content; surrounding whitespace is trimmed first
    pub fn update_content(&self, id: &NoteId, new_content: &str) -> Result<Note> {
        let new_content = new_content.trim();
        self.update_with(id, |note| {
            if note.content == new_content {
                return false;
            }
            note.content = new_content.to_string();
            true
        })
    }

    pub fn set_done(&self, id: &NoteId, done: bool) -> Result<Note> {
        self.update_with(id, |note| {
            if note.done == done {
                return false;
            }
            note.done = done;
            true
        })
    }

    /// Id of the first note whose name equals the trimmed `name`
    pub fn find_id_by_name(&self, name: &str) -> Result<NoteId> {
        let name = name.trim();
        self.read()
            .iter()
            .find(|note| note.name == name)
            .map(|note| note.id)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Fold a note set from the relay into the store, last writer wins per note
    ///
    /// The whole batch is refused when any note is malformed.
    pub fn merge_remote(&self, incoming: Vec<Note>) -> Result<Reconciled> {
        validate_incoming(&incoming)?;

        let mut notes = self.write();
        let merged = reconcile(&notes, incoming);
        if merged.changed() {
            self.commit(&mut notes, merged.notes.clone())?;
        }

        tracing::info!(
            added = merged.added,
            accepted = merged.accepted,
            retained = merged.retained,
            "Merged remote notes"
        );
        Ok(merged)
    }

    /// Apply `edit` to one note; `edit` returns false when nothing changed
    fn update_with(&self, id: &NoteId, edit: impl FnOnce(&mut Note) -> bool) -> Result<Note> {
        let mut notes = self.write();
        let index = notes
            .iter()
            .position(|note| note.id == *id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let mut updated = notes[index].clone();
        if !edit(&mut updated) {
            return Ok(updated);
        }
        updated.touch();

        let mut next = notes.clone();
        next[index] = updated.clone();
        self.commit(&mut notes, next)?;

        tracing::debug!(%id, revision = updated.revision, "Updated note");
        Ok(updated)
    }

    /// Persist `next`, then make it the cache
    fn commit(&self, cache: &mut RwLockWriteGuard<'_, Vec<Note>>, next: Vec<Note>) -> Result<()> {
        write_json_atomic(&self.path, &next, Layout::Compact)?;
        **cache = next;
        Ok(())
    }

    // A panic while holding the lock cannot leave the cache half-written:
    // it is only ever replaced wholesale after a successful write.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Note>> {
        self.notes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Note>> {
        self.notes.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use tempfile::{tempdir, TempDir};

    fn setup() -> (TempDir, NoteStore) {
        let tmp = tempdir().unwrap();
        let store = NoteStore::open(tmp.path().join("biji").join("biji.json")).unwrap();
        (tmp, store)
    }

    fn on_disk(store: &NoteStore) -> Vec<Note> {
        read_json(store.path()).unwrap()
    }

    #[test]
    fn test_open_creates_empty_document() {
        let (_tmp, store) = setup();
        assert!(store.is_empty());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "[]");
    }

    #[test]
    fn test_open_loads_existing_notes() {
        let (_tmp, store) = setup();
        let note = store.create("Hello", "Biji").unwrap();

        let reopened = NoteStore::open(store.path()).unwrap();
        assert_eq!(reopened.get(&note.id).unwrap(), note);
    }

    #[test]
    fn test_open_rejects_corrupt_document() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("biji.json");
        std::fs::write(&path, "[{").unwrap();

        let error = NoteStore::open(&path).unwrap_err();
        assert!(error.is_io_failure());
    }

    #[test]
    fn test_create_and_get() {
        let (_tmp, store) = setup();

        let note = store.create("  Hello ", "Biji").unwrap();
        assert_eq!(note.name, "Hello");
        assert_eq!(note.content, "Biji");
        assert_eq!(note.created_at, note.modified_at);

        let fetched = store.get(&note.id).unwrap();
        assert_eq!(fetched.name, "Hello");
        assert_eq!(fetched.content, "Biji");
        assert_eq!(fetched.created_at, fetched.modified_at);
        assert_eq!(on_disk(&store), vec![note]);
    }

    #[test]
    fn test_create_duplicate_name_conflicts() {
        let (_tmp, store) = setup();
        store.create("todo", "first").unwrap();

        let error = store.create(" todo  ", "second").unwrap_err();
        assert!(matches!(error, Error::NameConflict(name) if name == "todo"));
        assert_eq!(store.len(), 1);
        assert_eq!(on_disk(&store).len(), 1);
    }

    #[test]
    fn test_create_name_match_is_case_sensitive() {
        let (_tmp, store) = setup();
        store.create("todo", "").unwrap();
        store.create("Todo", "").unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let (_tmp, store) = setup();
        let error = store.create("   ", "content").unwrap_err();
        assert!(matches!(error, Error::MalformedInput(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_unknown_id() {
        let (_tmp, store) = setup();
        let error = store.get(&NoteId::new()).unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
    }

    #[test]
    fn test_delete() {
        let (_tmp, store) = setup();
        let keep = store.create("keep", "").unwrap();
        let drop = store.create("drop", "").unwrap();

        store.delete(&drop.id).unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.get(&drop.id).is_err());
        assert_eq!(on_disk(&store), vec![keep]);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let (_tmp, store) = setup();
        store.create("only", "").unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        store.delete(&NoteId::new()).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_rename_same_name_is_noop() {
        let (_tmp, store) = setup();
        let note = store.create("same", "").unwrap();

        let renamed = store.rename(&note.id, "  same ").unwrap();

        assert_eq!(renamed, note);
        assert_eq!(store.get(&note.id).unwrap().modified_at, note.modified_at);
    }

    #[test]
    fn test_rename_advances_modified_at() {
        let (_tmp, store) = setup();
        let note = store.create("before", "").unwrap();

        let renamed = store.rename(&note.id, "after").unwrap();

        assert_eq!(renamed.name, "after");
        assert!(renamed.modified_at > note.modified_at);
        assert_eq!(renamed.created_at, note.created_at);
        assert_eq!(on_disk(&store)[0].name, "after");
    }

    #[test]
    fn test_rename_unknown_id() {
        let (_tmp, store) = setup();
        let error = store.rename(&NoteId::new(), "x").unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
    }

    #[test]
    fn test_rename_allows_duplicate_names() {
        let (_tmp, store) = setup();
        store.create("first", "").unwrap();
        let second = store.create("second", "").unwrap();

        let renamed = store.rename(&second.id, "first").unwrap();

        assert_eq!(renamed.name, "first");
        assert_eq!(
            store.names().iter().filter(|name| *name == "first").count(),
            2
        );
    }

    #[test]
    fn test_update_content() {
        let (_tmp, store) = setup();
        let note = store.create("n", "old").unwrap();

        let unchanged = store.update_content(&note.id, "old").unwrap();
        assert_eq!(unchanged.modified_at, note.modified_at);

        let updated = store.update_content(&note.id, "new").unwrap();
        assert_eq!(updated.content, "new");
        assert!(updated.modified_at > note.modified_at);
        assert_eq!(on_disk(&store)[0].content, "new");

        let error = store.update_content(&NoteId::new(), "x").unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
    }

    #[test]
    fn test_update_content_trims_before_comparing() {
        let (_tmp, store) = setup();
        let note = store.create("n", "hello").unwrap();

        let unchanged = store.update_content(&note.id, "  hello\n").unwrap();
        assert_eq!(unchanged.content, "hello");
        assert_eq!(unchanged.modified_at, note.modified_at);
        assert_eq!(unchanged.revision, note.revision);

        let updated = store.update_content(&note.id, "\n  world \n").unwrap();
        assert_eq!(updated.content, "world");
        assert_eq!(on_disk(&store)[0].content, "world");
    }

    #[test]
    fn test_set_done() {
        let (_tmp, store) = setup();
        let note = store.create("task", "").unwrap();

        let done = store.set_done(&note.id, true).unwrap();
        assert!(done.done);
        assert!(done.modified_at > note.modified_at);

        let again = store.set_done(&note.id, true).unwrap();
        assert_eq!(again.modified_at, done.modified_at);
    }

    #[test]
    fn test_list_sorted_by_modified_desc() {
        let (_tmp, store) = setup();
        let a = store.create("a", "").unwrap();
        store.create("b", "").unwrap();
        store.create("c", "").unwrap();
        store.update_content(&a.id, "touched").unwrap();

        let notes = store.list();
        assert_eq!(notes[0].name, "a");
        for pair in notes.windows(2) {
            assert!(pair[0].modified_at >= pair[1].modified_at);
        }
        assert_eq!(store.names()[0], "a");
    }

    #[test]
    fn test_find_id_by_name() {
        let (_tmp, store) = setup();
        let note = store.create("lookup", "").unwrap();

        assert_eq!(store.find_id_by_name(" lookup ").unwrap(), note.id);
        assert!(matches!(
            store.find_id_by_name("missing"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_failed_write_leaves_cache_untouched() {
        let (tmp, store) = setup();
        let note = store.create("kept", "").unwrap();
        std::fs::remove_dir_all(tmp.path().join("biji")).unwrap();

        assert!(store.create("lost", "").unwrap_err().is_io_failure());
        assert!(store.rename(&note.id, "renamed").unwrap_err().is_io_failure());

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&note.id).unwrap().name, "kept");
    }

    #[test]
    fn test_merge_remote() {
        let (_tmp, store) = setup();
        let local = store.create("local", "v1").unwrap();

        let mut remote_edit = local.clone();
        remote_edit.content = "v2".to_string();
        remote_edit.touch();
        let remote_only = Note::new("remote", "");

        let merged = store
            .merge_remote(vec![remote_edit, remote_only.clone()])
            .unwrap();

        assert_eq!(merged.added, 1);
        assert_eq!(merged.accepted, 1);
        assert_eq!(store.get(&local.id).unwrap().content, "v2");
        assert_eq!(store.get(&remote_only.id).unwrap().name, "remote");
        assert_eq!(on_disk(&store).len(), 2);
    }

    #[test]
    fn test_merge_remote_rejects_malformed_notes() {
        let (_tmp, store) = setup();
        let local = store.create("local", "v1").unwrap();

        let mut blank = Note::new("blank", "");
        blank.name = "   ".to_string();
        let mut backwards = Note::new("backwards", "");
        backwards.modified_at = backwards.created_at - chrono::Duration::days(1);
        let valid = Note::new("valid", "");

        for bad in [blank, backwards] {
            let error = store.merge_remote(vec![valid.clone(), bad]).unwrap_err();
            assert!(matches!(error, Error::MalformedInput(_)));
        }

        assert_eq!(store.list(), vec![local.clone()]);
        assert_eq!(on_disk(&store), vec![local]);
    }

    #[test]
    fn test_concurrent_creates() {
        let (_tmp, store) = setup();
        let names = ["one", "two", "three", "four", "five"];

        std::thread::scope(|scope| {
            for name in names {
                let store = &store;
                scope.spawn(move || store.create(name, "content").unwrap());
            }
        });

        assert_eq!(store.len(), 5);
        let stored = store.names();
        for name in names {
            assert_eq!(stored.iter().filter(|n| *n == name).count(), 1);
        }
        let persisted: HashSet<String> = on_disk(&store).into_iter().map(|n| n.name).collect();
        assert_eq!(persisted.len(), 5);
    }

    #[test]
    fn test_concurrent_updates_and_deletes() {
        let (_tmp, store) = setup();
        let notes: Vec<Note> = (0..8)
            .map(|i| store.create(&format!("note-{i}"), "").unwrap())
            .collect();

        std::thread::scope(|scope| {
            for (i, note) in notes.iter().enumerate() {
                let store = &store;
                scope.spawn(move || {
                    if i % 2 == 0 {
                        store.delete(&note.id).unwrap();
                    } else {
                        store.update_content(&note.id, "updated").unwrap();
                    }
                });
            }
        });

        assert_eq!(store.len(), 4);
        assert!(store.list().iter().all(|note| note.content == "updated"));
        assert_eq!(on_disk(&store).len(), 4);
    }
}
