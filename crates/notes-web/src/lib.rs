//! notes-web library: the router, handlers and pages of the notes service.
//!
//! The binary in `main.rs` only parses the command line and serves
//! [`router`]; tests drive the same router in-process.

pub mod auth;
pub mod config;
pub mod error;
pub mod html;
pub mod pages;
pub mod routes;
pub mod urls;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use notes_core::{NoteStore, UserStore};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use urls::{Route, reverse};

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub notes: NoteStore,
    pub users: UserStore,
}

impl AppState {
    /// State backed by JSON files in `data_path`.
    pub fn open(config: Config, data_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_path)
            .with_context(|| format!("Failed to create data directory: {:?}", data_path))?;

        let notes = NoteStore::open(data_path).context("Failed to load notes")?;
        let users = UserStore::open(data_path).context("Failed to load users")?;

        Ok(Self {
            config,
            notes,
            users,
        })
    }

    /// State that lives only in memory; each call starts empty.
    pub fn in_memory(config: Config) -> Self {
        Self {
            config,
            notes: NoteStore::in_memory(),
            users: UserStore::in_memory(),
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Public pages
        .route("/", get(routes::notes::home))
        .route(
            "/auth/login/",
            get(routes::users::login_form).post(routes::users::login),
        )
        .route(
            "/auth/logout/",
            get(routes::users::logout).post(routes::users::logout),
        )
        .route(
            "/auth/signup/",
            get(routes::users::signup_form).post(routes::users::signup),
        )
        // Notes, login required
        .route("/notes/", get(routes::notes::list))
        .route(
            "/add/",
            get(routes::notes::add_form).post(routes::notes::add),
        )
        .route("/note/{slug}/", get(routes::notes::detail))
        .route(
            "/edit/{slug}/",
            get(routes::notes::edit_form).post(routes::notes::edit),
        )
        .route(
            "/delete/{slug}/",
            get(routes::notes::delete_confirm).post(routes::notes::delete),
        )
        .route("/done/", get(routes::notes::success))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
