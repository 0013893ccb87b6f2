//! Ownership rules for notes.
//!
//! A note is only ever visible to its author. Looking up someone else's note
//! fails exactly like looking up a slug that doesn't exist, so other users'
//! slugs can't be probed.

use thiserror::Error;

use crate::model::Note;
use crate::store::NoteStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("No note with slug '{0}'")]
    NotFound(String),
}

/// Resolve `slug` to a note owned by `username`.
pub fn owned_note(notes: &NoteStore, username: &str, slug: &str) -> Result<Note, AccessError> {
    match notes.get_by_slug(slug) {
        Some(note) if note.is_owned_by(username) => Ok(note),
        Some(note) => {
            tracing::debug!(
                "User {} denied access to note {} owned by {}",
                username,
                note.slug,
                note.author
            );
            Err(AccessError::NotFound(slug.to_string()))
        }
        None => Err(AccessError::NotFound(slug.to_string())),
    }
}

/// The notes `username` may see, in creation order.
pub fn visible_notes(notes: &NoteStore, username: &str) -> Vec<Note> {
    notes.list_by_author(username)
}
