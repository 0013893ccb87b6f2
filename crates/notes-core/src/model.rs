//! Records kept by the note and user stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a note title, in characters.
pub const TITLE_MAX_LENGTH: usize = 100;

/// Maximum length of a note slug, in characters.
pub const SLUG_MAX_LENGTH: usize = 100;

/// Maximum length of a username, in characters.
pub const USERNAME_MAX_LENGTH: usize = 150;

/// A note owned by exactly one user.
///
/// `id` is assigned by the store and only ever grows, so sorting by it
/// reproduces creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub title: String,
    pub text: String,
    pub slug: String,
    /// Username of the owner
    pub author: String,
}

impl Note {
    /// Whether `username` owns this note.
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.author == username
    }
}

/// Validated note fields, ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub text: String,
    pub slug: String,
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    /// Argon2 PHC string, or [`UNUSABLE_PASSWORD`]
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

/// Password hash marker for accounts that cannot log in with a password.
pub const UNUSABLE_PASSWORD: &str = "!";

impl User {
    pub fn has_usable_password(&self) -> bool {
        self.password_hash != UNUSABLE_PASSWORD
    }
}
