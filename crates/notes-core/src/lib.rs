//! Core of the notes service: note and user storage, form validation and
//! ownership rules. Nothing in here knows about HTTP.

pub mod access;
pub mod error;
pub mod form;
pub mod model;
pub mod password;
mod persist;
pub mod slug;
pub mod store;
pub mod users;

pub use access::{AccessError, owned_note, visible_notes};
pub use error::StoreError;
pub use form::{Credentials, FormErrors, LoginForm, NoteForm, SignupForm};
pub use model::{Note, NoteDraft, User};
pub use store::NoteStore;
pub use users::{UserError, UserStore};
