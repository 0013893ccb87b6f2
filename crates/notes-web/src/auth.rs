//! Session cookies and the login wall.
//!
//! Handlers that take a [`CurrentUser`] are only reached by logged-in users;
//! everyone else is sent to the login page with `next` pointing back at the
//! page they asked for.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use cookie::{Cookie, SameSite};
use notes_core::User;

use crate::AppState;
use crate::config::SessionConfig;
use crate::urls::Route;

pub const SESSION_COOKIE_NAME: &str = "notes_session";

/// The logged-in user. Anonymous requests are rejected with a [`LoginRedirect`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = LoginRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match user_from_headers(&parts.headers, state) {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                tracing::debug!("Anonymous request to {}, redirecting to login", next);
                Err(LoginRedirect::to(next))
            }
        }
    }
}

/// The logged-in user, if any. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(user_from_headers(&parts.headers, state)))
    }
}

/// `302 Found` to the login page, remembering where the user was going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    location: String,
}

impl LoginRedirect {
    pub fn to(next: &str) -> Self {
        Self {
            location: login_url(next),
        }
    }
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        found(&self.location)
    }
}

/// `302 Found` to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// The login URL with `next` set. Slashes in `next` are kept readable.
pub fn login_url(next: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{}?next={}", Route::Login.path(), encoded.replace("%2F", "/"))
}

/// Whether `next` may be redirected to after login: a path on this site.
///
/// Browsers drop tabs and newlines from URLs, so `/\t/host` would be followed
/// as `//host`. Any control character is refused.
pub fn is_safe_redirect(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(char::is_control)
}

/// Read the raw session token from the `Cookie` header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|part| Cookie::parse(part.trim()).ok())
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

/// Resolve the session cookie to a user.
pub fn user_from_headers(headers: &HeaderMap, state: &AppState) -> Option<User> {
    let token = session_token(headers)?;
    state.users.validate_session(&token)
}

/// `Set-Cookie` value that starts a session.
pub fn session_cookie(token: &str, config: &SessionConfig) -> String {
    let max_age = i64::try_from(config.session_lifetime_secs).unwrap_or(i64::MAX);
    Cookie::build((SESSION_COOKIE_NAME, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookie)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age))
        .build()
        .to_string()
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie() -> String {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_login_url_keeps_slashes() {
        assert_eq!(login_url("/notes/"), "/auth/login/?next=/notes/");
        assert_eq!(
            login_url("/edit/Zagolovok/"),
            "/auth/login/?next=/edit/Zagolovok/"
        );
    }

    #[test]
    fn test_login_url_encodes_query() {
        assert_eq!(
            login_url("/notes/?page=2&x=1"),
            "/auth/login/?next=/notes/%3Fpage%3D2%26x%3D1"
        );
    }

    #[test]
    fn test_is_safe_redirect() {
        assert!(is_safe_redirect("/notes/"));
        assert!(!is_safe_redirect("//evil.example/"));
        assert!(!is_safe_redirect("https://evil.example/"));
        assert!(!is_safe_redirect("/\\evil.example"));
        assert!(!is_safe_redirect(""));
        assert!(!is_safe_redirect("/\t/evil.example/"));
        assert!(!is_safe_redirect("/\r\n/evil.example/"));
        assert!(is_safe_redirect("/notes/?page=2"));
    }

    #[test]
    fn test_session_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; notes_session=abc123; other=1"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));

        let empty = HeaderMap::new();
        assert_eq!(session_token(&empty), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok", &SessionConfig::default());
        assert!(cookie.starts_with("notes_session=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("Secure"));

        let cleared = clear_session_cookie();
        assert!(cleared.contains("Max-Age=0"));
    }

    #[test]
    fn test_found_is_302() {
        let response = found("/done/");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/done/");
    }
}
