use thiserror::Error;

/// Errors returned by the note and user stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Slug already in use: {0}")]
    SlugTaken(String),

    #[error("Username already in use: {0}")]
    UsernameTaken(String),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
