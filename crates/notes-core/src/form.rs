//! Form input and validation.
//!
//! Forms hold the raw submitted strings so a rejected form can be rendered
//! again exactly as typed. `validate` turns them into typed values or a set
//! of per-field error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    Note, NoteDraft, SLUG_MAX_LENGTH, TITLE_MAX_LENGTH, USERNAME_MAX_LENGTH,
};
use crate::slug::{is_valid_slug, slugify};
use crate::store::NoteStore;
use crate::users::UserStore;

/// Appended to a slug that another note already uses.
pub const SLUG_TAKEN_WARNING: &str = " - такой slug уже существует, придумайте уникальное значение!";

/// Minimum password length accepted at signup.
pub const PASSWORD_MIN_LENGTH: usize = 8;

const REQUIRED: &str = "This field is required.";

/// Error messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    /// Key for errors that don't belong to a single field.
    pub const NON_FIELD: &'static str = "__all__";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages for `field`, empty if it has none.
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

/// Raw input of the note create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub slug: String,
}

impl NoteForm {
    /// A form pre-filled with an existing note's fields.
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            text: note.text.clone(),
            slug: note.slug.clone(),
        }
    }

    /// Validate the form for creating a note (`instance` is `None`) or for
    /// editing `instance`, whose own slug doesn't count as taken.
    pub fn validate(
        &self,
        notes: &NoteStore,
        instance: Option<&Note>,
    ) -> Result<NoteDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.add("title", REQUIRED);
        } else if title.chars().count() > TITLE_MAX_LENGTH {
            errors.add(
                "title",
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    TITLE_MAX_LENGTH,
                    title.chars().count()
                ),
            );
        }

        let text = self.text.trim();
        if text.is_empty() {
            errors.add("text", REQUIRED);
        }

        let slug = match self.slug.trim() {
            "" => slugify(title),
            given => given.to_string(),
        };

        if slug.is_empty() {
            if !title.is_empty() {
                errors.add(
                    "slug",
                    "Could not build a slug from the title, please enter one.",
                );
            }
        } else if slug.chars().count() > SLUG_MAX_LENGTH {
            errors.add(
                "slug",
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    SLUG_MAX_LENGTH,
                    slug.chars().count()
                ),
            );
        } else if !is_valid_slug(&slug) {
            errors.add(
                "slug",
                "Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens.",
            );
        } else if notes.slug_taken(&slug, instance.map(|n| n.id)) {
            errors.add("slug", format!("{}{}", slug, SLUG_TAKEN_WARNING));
        }

        errors.into_result(|| NoteDraft {
            title: title.to_string(),
            text: text.to_string(),
            slug,
        })
    }
}

/// Raw input of the login form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Where to go after logging in
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    /// Check that both fields are filled in. Credentials are checked by the caller.
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.username.trim().is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.into_result(|| ())
    }
}

/// Raw input of the signup form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Validated signup input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl SignupForm {
    pub fn validate(&self, users: &UserStore) -> Result<Credentials, FormErrors> {
        let mut errors = FormErrors::new();

        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if username.chars().count() > USERNAME_MAX_LENGTH {
            errors.add(
                "username",
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    USERNAME_MAX_LENGTH,
                    username.chars().count()
                ),
            );
        } else if !is_valid_username(username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        } else if users.exists(username) {
            errors.add("username", "A user with that username already exists.");
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        }

        if !self.password1.is_empty() && !self.password2.is_empty() {
            if self.password1 != self.password2 {
                errors.add("password2", "The two password fields didn't match.");
            } else {
                if self.password1.chars().count() < PASSWORD_MIN_LENGTH {
                    errors.add(
                        "password2",
                        format!(
                            "This password is too short. It must contain at least {} characters.",
                            PASSWORD_MIN_LENGTH
                        ),
                    );
                }
                if self.password1.chars().all(|c| c.is_ascii_digit()) {
                    errors.add("password2", "This password is entirely numeric.");
                }
            }
        }

        errors.into_result(|| Credentials {
            username: username.to_string(),
            password: self.password1.clone(),
        })
    }
}

/// Letters, digits and `@ . + - _`.
fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, text: &str, slug: &str) -> NoteForm {
        NoteForm {
            title: title.to_string(),
            text: text.to_string(),
            slug: slug.to_string(),
        }
    }

    fn existing_note(store: &NoteStore, slug: &str) -> Note {
        store
            .create(
                "alice",
                NoteDraft {
                    title: "Existing".to_string(),
                    text: "Text".to_string(),
                    slug: slug.to_string(),
                },
            )
            .unwrap()
    }

    #[test]
    fn test_valid_note_form() {
        let store = NoteStore::in_memory();
        let draft = form(" Title ", "Body", "my-note").validate(&store, None).unwrap();

        assert_eq!(draft.title, "Title");
        assert_eq!(draft.text, "Body");
        assert_eq!(draft.slug, "my-note");
    }

    #[test]
    fn test_missing_fields() {
        let store = NoteStore::in_memory();
        let errors = form("", "  ", "").validate(&store, None).unwrap_err();

        assert_eq!(errors.get("title"), [REQUIRED.to_string()]);
        assert_eq!(errors.get("text"), [REQUIRED.to_string()]);
        // Nothing to derive a slug from, but the title error already covers it
        assert!(!errors.has("slug"));
    }

    #[test]
    fn test_blank_slug_is_derived_from_title() {
        let store = NoteStore::in_memory();
        let draft = form("Заголовок", "Текст", "").validate(&store, None).unwrap();
        assert_eq!(draft.slug, "zagolovok");
    }

    #[test]
    fn test_underivable_slug() {
        let store = NoteStore::in_memory();
        let errors = form("!!!", "Text", "").validate(&store, None).unwrap_err();
        assert!(errors.has("slug"));
        assert!(!errors.has("title"));
    }

    #[test]
    fn test_duplicate_slug_is_a_field_error() {
        let store = NoteStore::in_memory();
        existing_note(&store, "taken");

        let errors = form("Title", "Text", "taken").validate(&store, None).unwrap_err();
        assert_eq!(
            errors.get("slug"),
            [format!("taken{}", SLUG_TAKEN_WARNING)]
        );
    }

    #[test]
    fn test_derived_slug_is_checked_for_duplicates() {
        let store = NoteStore::in_memory();
        existing_note(&store, "zagolovok");

        let errors = form("Заголовок", "Text", "").validate(&store, None).unwrap_err();
        assert!(errors.get("slug")[0].starts_with("zagolovok"));
    }

    #[test]
    fn test_edit_keeps_own_slug() {
        let store = NoteStore::in_memory();
        let note = existing_note(&store, "mine");

        let draft = form("Renamed", "Text", "mine")
            .validate(&store, Some(&note))
            .unwrap();
        assert_eq!(draft.slug, "mine");
    }

    #[test]
    fn test_invalid_slug_characters() {
        let store = NoteStore::in_memory();
        let errors = form("Title", "Text", "not a slug")
            .validate(&store, None)
            .unwrap_err();
        assert!(errors.has("slug"));
    }

    #[test]
    fn test_length_limits() {
        let store = NoteStore::in_memory();
        let long = "x".repeat(TITLE_MAX_LENGTH + 1);
        let errors = form(&long, "Text", &long).validate(&store, None).unwrap_err();
        assert!(errors.has("title"));
        assert!(errors.has("slug"));

        let exact = "x".repeat(TITLE_MAX_LENGTH);
        assert!(form(&exact, "Text", "ok").validate(&store, None).is_ok());
    }

    #[test]
    fn test_from_note_round_trips_fields() {
        let store = NoteStore::in_memory();
        let note = existing_note(&store, "existing");
        let form = NoteForm::from_note(&note);
        assert_eq!(form.title, "Existing");
        assert_eq!(form.slug, "existing");
    }

    #[test]
    fn test_login_form_requires_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("password"));
    }

    fn signup(username: &str, password1: &str, password2: &str) -> SignupForm {
        SignupForm {
            username: username.to_string(),
            password1: password1.to_string(),
            password2: password2.to_string(),
        }
    }

    #[test]
    fn test_signup_valid() {
        let users = UserStore::in_memory();
        let credentials = signup("leo.tolstoy", "war-and-peace", "war-and-peace")
            .validate(&users)
            .unwrap();
        assert_eq!(credentials.username, "leo.tolstoy");
        assert_eq!(credentials.password, "war-and-peace");
    }

    #[test]
    fn test_signup_rejections() {
        let users = UserStore::in_memory();
        users.create_user_without_password("taken").unwrap();

        let errors = signup("taken", "long-enough", "long-enough")
            .validate(&users)
            .unwrap_err();
        assert!(errors.has("username"));

        let errors = signup("has space", "long-enough", "long-enough")
            .validate(&users)
            .unwrap_err();
        assert!(errors.has("username"));

        let errors = signup("new", "long-enough", "different")
            .validate(&users)
            .unwrap_err();
        assert_eq!(errors.get("password2"), ["The two password fields didn't match."]);

        let errors = signup("new", "short", "short").validate(&users).unwrap_err();
        assert!(errors.get("password2")[0].contains("too short"));

        let errors = signup("new", "1234567890", "1234567890")
            .validate(&users)
            .unwrap_err();
        assert_eq!(errors.get("password2"), ["This password is entirely numeric."]);
    }

    #[test]
    fn test_signup_accepts_unicode_letters() {
        let users = UserStore::in_memory();
        assert!(signup("Лев", "long-enough", "long-enough").validate(&users).is_ok());
    }
}
