//! Login, logout and signup pages

use std::sync::Arc;

use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use notes_core::{FormErrors, LoginForm, SignupForm, StoreError, User, UserError};
use serde::Deserialize;

use crate::AppState;
use crate::auth::{
    MaybeUser, clear_session_cookie, found, is_safe_redirect, session_cookie, session_token,
};
use crate::error::AppError;
use crate::pages::{LoggedOutContext, LoginContext, Page, SignupContext};
use crate::urls::Route;

const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Page to return to after logging in
    pub next: Option<String>,
}

/// GET /auth/login/ - Show login form
pub async fn login_form(
    MaybeUser(user): MaybeUser,
    Query(query): Query<LoginQuery>,
) -> Response {
    Page::new(LoginContext::new(query.next))
        .viewer(user.as_ref())
        .into_response()
}

/// POST /auth/login/ - Check credentials and start a session
pub async fn login(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        return Ok(login_page(form, errors, viewer.as_ref()));
    }

    // Argon2 is CPU-heavy, run it on the blocking pool
    let user = {
        let state = Arc::clone(&state);
        let username = form.username.trim().to_string();
        let password = form.password.clone();
        tokio::task::spawn_blocking(move || state.users.authenticate(&username, &password))
            .await?
    };

    let Some(user) = user else {
        tracing::info!("Failed login for {}", form.username.trim());
        let mut errors = FormErrors::new();
        errors.add(FormErrors::NON_FIELD, INVALID_LOGIN);
        return Ok(login_page(form, errors, viewer.as_ref()));
    };

    let token = state
        .users
        .create_session(&user.username, state.config.session.session_lifetime_secs)?;

    let redirect_to = form
        .next
        .as_deref()
        .filter(|next| is_safe_redirect(next))
        .map(str::to_string)
        .unwrap_or_else(|| Route::Home.path());

    tracing::info!("User {} logged in", user.username);

    Ok((
        [(header::SET_COOKIE, session_cookie(&token, &state.config.session))],
        found(&redirect_to),
    )
        .into_response())
}

fn login_page(form: LoginForm, errors: FormErrors, viewer: Option<&User>) -> Response {
    let form = LoginForm {
        password: String::new(),
        ..form
    };
    Page::new(LoginContext { form, errors })
        .viewer(viewer)
        .into_response()
}

/// GET|POST /auth/logout/ - End the session and clear the cookie
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        match state.users.revoke_session(&token) {
            Ok(true) => tracing::info!("Session ended"),
            Ok(false) => {}
            Err(e) => tracing::warn!("Failed to revoke session: {}", e),
        }
    }

    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Page::new(LoggedOutContext),
    )
        .into_response()
}

/// GET /auth/signup/ - Show registration form
pub async fn signup_form(MaybeUser(user): MaybeUser) -> Response {
    Page::new(SignupContext {
        form: SignupForm::default(),
        errors: FormErrors::new(),
    })
    .viewer(user.as_ref())
    .into_response()
}

/// POST /auth/signup/ - Register a user, then send them to login
pub async fn signup(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let credentials = match form.validate(&state.users) {
        Ok(c) => c,
        Err(errors) => return Ok(signup_page(form, errors, viewer.as_ref())),
    };

    let created = {
        let state = Arc::clone(&state);
        let username = credentials.username.clone();
        tokio::task::spawn_blocking(move || {
            state.users.create_user(&username, &credentials.password)
        })
        .await?
    };

    match created {
        Ok(_) => Ok(found(&Route::Login.path())),
        Err(UserError::Store(StoreError::UsernameTaken(_))) => {
            let mut errors = FormErrors::new();
            errors.add("username", "A user with that username already exists.");
            Ok(signup_page(form, errors, viewer.as_ref()))
        }
        Err(e) => Err(e.into()),
    }
}

fn signup_page(form: SignupForm, errors: FormErrors, viewer: Option<&User>) -> Response {
    let form = SignupForm {
        password1: String::new(),
        password2: String::new(),
        ..form
    };
    Page::new(SignupContext { form, errors })
        .viewer(viewer)
        .into_response()
}
