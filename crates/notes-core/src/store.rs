//! Note storage.
//!
//! Notes live in a `BTreeMap` keyed by id, so iteration order is creation
//! order. Slug uniqueness is checked under the write lock, which makes the
//! store the final authority even when two requests validate the same slug
//! concurrently.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{Note, NoteDraft};
use crate::persist;

const NOTES_FILE: &str = "notes.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct NoteTable {
    /// Last id handed out; ids are never reused, even after deletes
    last_id: u64,
    notes: BTreeMap<u64, Note>,
}

impl NoteTable {
    fn slug_taken(&self, slug: &str, exclude_id: Option<u64>) -> bool {
        self.notes
            .values()
            .any(|n| n.slug == slug && Some(n.id) != exclude_id)
    }

    fn find_by_slug(&self, slug: &str) -> Option<&Note> {
        self.notes.values().find(|n| n.slug == slug)
    }
}

/// Storage for notes
pub struct NoteStore {
    path: Option<PathBuf>,
    table: RwLock<NoteTable>,
}

impl NoteStore {
    /// Create a store that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            table: RwLock::new(NoteTable::default()),
        }
    }

    /// Open the store persisted in `data_dir`, loading existing notes.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join(NOTES_FILE);
        let table: NoteTable = persist::load(Some(&path))?;
        tracing::info!("Loaded {} notes", table.notes.len());
        Ok(Self {
            path: Some(path),
            table: RwLock::new(table),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, NoteTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, NoteTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    // --- Queries ---

    /// Number of notes across all users.
    pub fn len(&self) -> usize {
        self.read().notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<Note> {
        self.read().find_by_slug(slug).cloned()
    }

    /// Notes owned by `author`, ascending by id.
    pub fn list_by_author(&self, author: &str) -> Vec<Note> {
        self.read()
            .notes
            .values()
            .filter(|n| n.is_owned_by(author))
            .cloned()
            .collect()
    }

    /// Whether a note other than `exclude_id` already uses `slug`.
    pub fn slug_taken(&self, slug: &str, exclude_id: Option<u64>) -> bool {
        self.read().slug_taken(slug, exclude_id)
    }

    // --- Mutations ---

    /// Create a note owned by `author`.
    pub fn create(&self, author: &str, draft: NoteDraft) -> Result<Note, StoreError> {
        let slug = draft.slug.clone();
        self.bulk_create(author, vec![draft])?
            .pop()
            .ok_or(StoreError::NoteNotFound(slug))
    }

    /// Create several notes owned by `author` in one write.
    ///
    /// Ids are assigned in input order. Either every note is created or none is.
    pub fn bulk_create(
        &self,
        author: &str,
        drafts: Vec<NoteDraft>,
    ) -> Result<Vec<Note>, StoreError> {
        let mut table = self.write();

        for (i, draft) in drafts.iter().enumerate() {
            let repeated = drafts[..i].iter().any(|d| d.slug == draft.slug);
            if repeated || table.slug_taken(&draft.slug, None) {
                return Err(StoreError::SlugTaken(draft.slug.clone()));
            }
        }

        let first_id = table.last_id + 1;
        let notes: Vec<Note> = drafts
            .into_iter()
            .zip(first_id..)
            .map(|(draft, id)| Note {
                id,
                title: draft.title,
                text: draft.text,
                slug: draft.slug,
                author: author.to_string(),
            })
            .collect();

        let previous_last_id = table.last_id;
        for note in &notes {
            table.last_id = note.id;
            table.notes.insert(note.id, note.clone());
        }

        if let Err(e) = persist::save(self.path.as_deref(), &*table) {
            for note in &notes {
                table.notes.remove(&note.id);
            }
            table.last_id = previous_last_id;
            return Err(e);
        }

        for note in &notes {
            tracing::info!("Created note {} ({}) for {}", note.id, note.slug, author);
        }
        Ok(notes)
    }

    /// Replace the title, text and slug of note `id`. Id and author are kept.
    pub fn update(&self, id: u64, draft: NoteDraft) -> Result<Note, StoreError> {
        let mut table = self.write();

        if table.slug_taken(&draft.slug, Some(id)) {
            return Err(StoreError::SlugTaken(draft.slug));
        }

        let Some(note) = table.notes.get_mut(&id) else {
            return Err(StoreError::NoteNotFound(id.to_string()));
        };
        let previous = note.clone();
        note.title = draft.title;
        note.text = draft.text;
        note.slug = draft.slug;
        let updated = note.clone();

        if let Err(e) = persist::save(self.path.as_deref(), &*table) {
            table.notes.insert(id, previous);
            return Err(e);
        }

        tracing::info!("Updated note {} ({})", updated.id, updated.slug);
        Ok(updated)
    }

    /// Permanently remove note `id`, returning it.
    pub fn delete(&self, id: u64) -> Result<Note, StoreError> {
        let mut table = self.write();

        let Some(removed) = table.notes.remove(&id) else {
            return Err(StoreError::NoteNotFound(id.to_string()));
        };

        if let Err(e) = persist::save(self.path.as_deref(), &*table) {
            table.notes.insert(id, removed);
            return Err(e);
        }

        tracing::info!("Deleted note {} ({})", removed.id, removed.slug);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn draft(slug: &str) -> NoteDraft {
        NoteDraft {
            title: format!("Title {}", slug),
            text: "Text".to_string(),
            slug: slug.to_string(),
        }
    }

    #[test]
    fn test_create_returns_stored_note() {
        let store = NoteStore::in_memory();
        let note = store.create("alice", draft("first")).unwrap();

        assert_eq!(note.author, "alice");
        assert_eq!(note.slug, "first");
        assert_eq!(store.get_by_slug("first"), Some(note));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ids_follow_creation_order() {
        let store = NoteStore::in_memory();
        let a = store.create("alice", draft("a")).unwrap();
        let b = store.create("bob", draft("b")).unwrap();
        let c = store.create("alice", draft("c")).unwrap();

        assert!(a.id < b.id && b.id < c.id);

        let listed: Vec<u64> = store.list_by_author("alice").iter().map(|n| n.id).collect();
        assert_eq!(listed, vec![a.id, c.id]);
    }

    #[test]
    fn test_list_excludes_other_authors() {
        let store = NoteStore::in_memory();
        store.create("alice", draft("mine")).unwrap();
        store.create("bob", draft("theirs")).unwrap();

        let listed = store.list_by_author("alice");
        assert_eq!(listed.len(), 1);
        assert!(listed.iter().all(|n| n.author == "alice"));
        assert!(store.list_by_author("carol").is_empty());
    }

    #[test]
    fn test_slug_is_unique_across_authors() {
        let store = NoteStore::in_memory();
        store.create("alice", draft("shared")).unwrap();

        let err = store.create("bob", draft("shared")).unwrap_err();
        assert!(matches!(err, StoreError::SlugTaken(s) if s == "shared"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_bulk_create_is_all_or_nothing() {
        let store = NoteStore::in_memory();
        store.create("alice", draft("zapis-3")).unwrap();

        let drafts = (0..5).map(|i| draft(&format!("zapis-{}", i))).collect();
        assert!(store.bulk_create("alice", drafts).is_err());
        assert_eq!(store.len(), 1);

        let drafts = vec![draft("dup"), draft("dup")];
        assert!(store.bulk_create("alice", drafts).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_bulk_create_assigns_ascending_ids() {
        let store = NoteStore::in_memory();
        let drafts = (0..10).map(|i| draft(&format!("zapis-{}", i))).collect();
        let notes = store.bulk_create("alice", drafts).unwrap();

        let ids: Vec<u64> = notes.iter().map(|n| n.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(store.list_by_author("alice").len(), 10);
    }

    #[test]
    fn test_update_keeps_id_and_author() {
        let store = NoteStore::in_memory();
        let note = store.create("alice", draft("old")).unwrap();

        let updated = store
            .update(
                note.id,
                NoteDraft {
                    title: "New title".to_string(),
                    text: "New text".to_string(),
                    slug: "new".to_string(),
                },
            )
            .unwrap();

        assert_eq!(updated.id, note.id);
        assert_eq!(updated.author, "alice");
        assert_eq!(updated.title, "New title");
        assert!(store.get_by_slug("old").is_none());
        assert_eq!(store.get_by_slug("new"), Some(updated));
    }

    #[test]
    fn test_update_may_keep_own_slug_but_not_take_another() {
        let store = NoteStore::in_memory();
        let first = store.create("alice", draft("first")).unwrap();
        store.create("bob", draft("second")).unwrap();

        assert!(store.update(first.id, draft("first")).is_ok());

        let err = store.update(first.id, draft("second")).unwrap_err();
        assert!(matches!(err, StoreError::SlugTaken(_)));
        assert_eq!(store.get_by_slug("second").unwrap().author, "bob");
    }

    #[test]
    fn test_delete_removes_permanently() {
        let store = NoteStore::in_memory();
        let note = store.create("alice", draft("gone")).unwrap();

        let removed = store.delete(note.id).unwrap();
        assert_eq!(removed.slug, "gone");
        assert!(store.get_by_slug("gone").is_none());
        assert!(matches!(
            store.delete(note.id),
            Err(StoreError::NoteNotFound(_))
        ));

        // Ids are not reused
        let next = store.create("alice", draft("gone")).unwrap();
        assert!(next.id > note.id);
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();

        {
            let store = NoteStore::open(temp_dir.path()).unwrap();
            store.create("alice", draft("a")).unwrap();
            let b = store.create("alice", draft("b")).unwrap();
            store.delete(b.id).unwrap();
        }

        let store = NoteStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get_by_slug("a").is_some());

        let c = store.create("alice", draft("c")).unwrap();
        assert_eq!(c.id, 3);
    }
}
