//! Shared fixtures for the HTTP tests.
//!
//! Every test builds its own in-memory [`TestApp`], so tests never share data.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use notes_core::{Note, NoteDraft, User};
use notes_web::{AppState, Config, auth::SESSION_COOKIE_NAME, router};
use tower::ServiceExt;

pub const PROTECTED_NAMES: [&str; 6] = [
    "notes:add",
    "notes:edit",
    "notes:detail",
    "notes:delete",
    "notes:list",
    "notes:success",
];

pub struct TestApp {
    pub state: Arc<AppState>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = Arc::new(AppState::in_memory(Config::default()));
        let router = router(Arc::clone(&state));
        Self { state, router }
    }

    /// A user that can only be logged in with [`TestApp::force_login`].
    pub fn create_user(&self, username: &str) -> User {
        self.state
            .users
            .create_user_without_password(username)
            .expect("Failed to create user")
    }

    /// Start a session for `user` without going through the login form.
    pub fn force_login(&self, user: &User) -> String {
        self.state
            .users
            .create_session(&user.username, 3600)
            .expect("Failed to create session")
    }

    pub fn create_note(&self, author: &User, title: &str, text: &str, slug: &str) -> Note {
        self.state
            .notes
            .create(
                &author.username,
                NoteDraft {
                    title: title.to_string(),
                    text: text.to_string(),
                    slug: slug.to_string(),
                },
            )
            .expect("Failed to create note")
    }

    pub async fn get(&self, uri: &str, session: Option<&str>) -> Response {
        let request = with_session(Request::builder().method("GET").uri(uri), session)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        session: Option<&str>,
        fields: &[(&str, &str)],
    ) -> Response {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = with_session(Request::builder().method("POST").uri(uri), session)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }
}

fn with_session(
    builder: axum::http::request::Builder,
    session: Option<&str>,
) -> axum::http::request::Builder {
    match session {
        Some(token) => builder.header(header::COOKIE, format!("{}={}", SESSION_COOKIE_NAME, token)),
        None => builder,
    }
}

/// URL of a protected route, using `slug` for the routes that take one.
pub fn protected_url(name: &str, slug: &str) -> String {
    match name {
        "notes:add" | "notes:list" | "notes:success" => notes_web::reverse(name, &[]),
        _ => notes_web::reverse(name, &[slug]),
    }
    .expect("Unknown route name")
}

/// Assert a `302 Found` to exactly `expected`.
pub fn assert_redirects(response: &Response, expected: &str) {
    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("Redirect without Location header")
        .to_str()
        .expect("Location is not ASCII");
    assert_eq!(location, expected);
}

/// The session token set by a response, if any.
pub fn session_from_response(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
