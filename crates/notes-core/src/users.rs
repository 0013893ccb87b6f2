//! User accounts and login sessions.
//!
//! Session tokens are handed to the browser once; only their SHA-256 hash is
//! kept, in memory and in `sessions.json`.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{UNUSABLE_PASSWORD, User};
use crate::password::{self, PasswordError};
use crate::persist;

const USERS_FILE: &str = "users.json";
const SESSIONS_FILE: &str = "sessions.json";

/// Length of the random session token given to the browser.
pub const SESSION_TOKEN_LENGTH: usize = 32;

/// Upper bound on session lifetimes (10 years).
const MAX_SESSION_LIFETIME_SECS: u64 = 10 * 365 * 24 * 3600;

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserTable {
    users: BTreeMap<String, User>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionTable {
    /// Maps token hash -> session
    sessions: HashMap<String, StoredSession>,
}

/// A login session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub token_hash: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Storage for users and their sessions
pub struct UserStore {
    users_path: Option<PathBuf>,
    sessions_path: Option<PathBuf>,
    users: RwLock<UserTable>,
    sessions: RwLock<SessionTable>,
}

impl UserStore {
    pub fn in_memory() -> Self {
        Self {
            users_path: None,
            sessions_path: None,
            users: RwLock::new(UserTable::default()),
            sessions: RwLock::new(SessionTable::default()),
        }
    }

    /// Open the store persisted in `data_dir`. Expired sessions are dropped on load.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let users_path = data_dir.join(USERS_FILE);
        let sessions_path = data_dir.join(SESSIONS_FILE);

        let users: UserTable = persist::load(Some(&users_path))?;
        let mut sessions: SessionTable = persist::load(Some(&sessions_path))?;

        let now = Utc::now();
        sessions.sessions.retain(|_, s| s.expires_at > now);

        tracing::info!(
            "Loaded {} users and {} active sessions",
            users.users.len(),
            sessions.sessions.len()
        );

        Ok(Self {
            users_path: Some(users_path),
            sessions_path: Some(sessions_path),
            users: RwLock::new(users),
            sessions: RwLock::new(sessions),
        })
    }

    // --- Users ---

    /// Register a user that logs in with `password`.
    pub fn create_user(&self, username: &str, password: &str) -> Result<User, UserError> {
        let password_hash = password::hash_password(password)?;
        Ok(self.insert_user(username, password_hash)?)
    }

    /// Register a user that cannot log in with a password.
    ///
    /// Such users only get sessions through [`UserStore::create_session`].
    pub fn create_user_without_password(&self, username: &str) -> Result<User, StoreError> {
        self.insert_user(username, UNUSABLE_PASSWORD.to_string())
    }

    fn insert_user(&self, username: &str, password_hash: String) -> Result<User, StoreError> {
        let mut table = self.users.write().unwrap_or_else(PoisonError::into_inner);
        if table.users.contains_key(username) {
            return Err(StoreError::UsernameTaken(username.to_string()));
        }

        let user = User {
            username: username.to_string(),
            password_hash,
            date_joined: Utc::now(),
        };
        table.users.insert(user.username.clone(), user.clone());

        if let Err(e) = persist::save(self.users_path.as_deref(), &*table) {
            table.users.remove(username);
            return Err(e);
        }

        tracing::info!("Registered user {}", username);
        Ok(user)
    }

    pub fn get(&self, username: &str) -> Option<User> {
        let table = self.users.read().unwrap_or_else(PoisonError::into_inner);
        table.users.get(username).cloned()
    }

    pub fn exists(&self, username: &str) -> bool {
        self.get(username).is_some()
    }

    /// Check a username/password pair.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<User> {
        let user = self.get(username)?;
        if !user.has_usable_password() {
            tracing::debug!("User {} has no usable password", username);
            return None;
        }

        match password::verify_password(password, &user.password_hash) {
            Ok(true) => Some(user),
            Ok(false) => {
                tracing::debug!("Wrong password for {}", username);
                None
            }
            Err(e) => {
                tracing::warn!("Stored password hash for {} is unreadable: {}", username, e);
                None
            }
        }
    }

    // --- Sessions ---

    /// Start a session for `username`, returning the raw token.
    pub fn create_session(&self, username: &str, lifetime_secs: u64) -> Result<String, StoreError> {
        let token = generate_random_string(SESSION_TOKEN_LENGTH);
        let token_hash = hash_token(&token);
        let now = Utc::now();
        let lifetime = Duration::seconds(lifetime_secs.min(MAX_SESSION_LIFETIME_SECS) as i64);

        let session = StoredSession {
            token_hash: token_hash.clone(),
            username: username.to_string(),
            created_at: now,
            expires_at: now + lifetime,
        };

        let mut table = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        table.sessions.insert(token_hash.clone(), session);
        if let Err(e) = persist::save(self.sessions_path.as_deref(), &*table) {
            table.sessions.remove(&token_hash);
            return Err(e);
        }

        Ok(token)
    }

    /// Resolve a raw session token to its user.
    ///
    /// Expired sessions and sessions whose user no longer exists resolve to `None`.
    pub fn validate_session(&self, token: &str) -> Option<User> {
        let username = {
            let table = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            let session = table.sessions.get(&hash_token(token))?;
            if session.expires_at <= Utc::now() {
                return None;
            }
            session.username.clone()
        };
        self.get(&username)
    }

    /// End a session. Returns whether it existed.
    pub fn revoke_session(&self, token: &str) -> Result<bool, StoreError> {
        let mut table = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let removed = table.sessions.remove(&hash_token(token)).is_some();
        if removed {
            persist::save(self.sessions_path.as_deref(), &*table)?;
        }
        Ok(removed)
    }

    /// Drop expired sessions, returning how many were removed.
    pub fn cleanup_expired(&self) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut table = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        let before = table.sessions.len();
        table.sessions.retain(|_, s| s.expires_at > now);
        let removed = before - table.sessions.len();

        if removed > 0 {
            persist::save(self.sessions_path.as_deref(), &*table)?;
            tracing::info!("Cleaned up {} expired sessions", removed);
        }
        Ok(removed)
    }
}

/// Errors from registering a user with a password.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Generate a cryptographically secure random string
pub fn generate_random_string(len: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..len)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hash a session token for storage (raw tokens are never stored)
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let result = hasher.finalize();
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, result)
}
