//! Mapping of handler failures to responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use notes_core::{AccessError, StoreError, UserError};
use thiserror::Error;

use crate::pages::{ErrorContext, Page};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    User(#[from] UserError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<AccessError> for AppError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::NotFound(slug) => AppError::NotFound(slug),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(what) => {
                tracing::debug!("Not found: {}", what);
                Page::new(ErrorContext {
                    heading: "Not found".to_string(),
                    message: "The page you asked for doesn't exist.".to_string(),
                })
                .status(StatusCode::NOT_FOUND)
                .into_response()
            }
            other => {
                tracing::error!("Request failed: {}", other);
                Page::new(ErrorContext {
                    heading: "Server error".to_string(),
                    message: "Something went wrong. Please try again.".to_string(),
                })
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .into_response()
            }
        }
    }
}
