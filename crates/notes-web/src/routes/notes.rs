//! Note pages: home, list, add, detail, edit, delete and the success page.
//!
//! Every handler except `home` takes a [`CurrentUser`], so anonymous visitors
//! are redirected to login before anything is looked up. Edit, detail and
//! delete resolve the slug through [`owned_note`], which answers 404 for notes
//! that belong to someone else.

use std::sync::Arc;

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use notes_core::form::SLUG_TAKEN_WARNING;
use notes_core::{FormErrors, Note, NoteForm, StoreError, User, owned_note, visible_notes};

use crate::AppState;
use crate::auth::{CurrentUser, MaybeUser, found};
use crate::error::AppError;
use crate::pages::{
    HomeContext, NoteDeleteContext, NoteDetailContext, NoteFormContext, NoteListContext, Page,
    SuccessContext,
};
use crate::urls::Route;

/// GET / - Landing page, open to everyone
pub async fn home(MaybeUser(user): MaybeUser) -> Response {
    let context = HomeContext {
        username: user.as_ref().map(|u| u.username.clone()),
    };
    Page::new(context).viewer(user.as_ref()).into_response()
}

/// GET /notes/ - The current user's notes in creation order
pub async fn list(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Response {
    let object_list = visible_notes(&state.notes, &user.username);
    Page::for_user(&user, NoteListContext { object_list }).into_response()
}

/// GET /add/ - Empty note form
pub async fn add_form(CurrentUser(user): CurrentUser) -> Response {
    Page::for_user(&user, NoteFormContext::unbound()).into_response()
}

/// POST /add/ - Create a note owned by the current user
pub async fn add(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<NoteForm>,
) -> Result<Response, AppError> {
    let draft = match form.validate(&state.notes, None) {
        Ok(draft) => draft,
        Err(errors) => return Ok(form_page(&user, form, errors, None)),
    };

    match state.notes.create(&user.username, draft) {
        Ok(_) => Ok(found(&Route::Success.path())),
        Err(StoreError::SlugTaken(slug)) => {
            Ok(form_page(&user, form, slug_taken_errors(&slug), None))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /note/{slug}/ - Show one of the current user's notes
pub async fn detail(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let note = owned_note(&state.notes, &user.username, &slug)?;
    Ok(Page::for_user(&user, NoteDetailContext { note }).into_response())
}

/// GET /edit/{slug}/ - Note form filled with the note's fields
pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let note = owned_note(&state.notes, &user.username, &slug)?;
    Ok(Page::for_user(&user, NoteFormContext::for_note(note)).into_response())
}

/// POST /edit/{slug}/ - Replace the note's fields
pub async fn edit(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
    Form(form): Form<NoteForm>,
) -> Result<Response, AppError> {
    let note = owned_note(&state.notes, &user.username, &slug)?;

    let draft = match form.validate(&state.notes, Some(&note)) {
        Ok(draft) => draft,
        Err(errors) => return Ok(form_page(&user, form, errors, Some(note))),
    };

    match state.notes.update(note.id, draft) {
        Ok(_) => Ok(found(&Route::Success.path())),
        Err(StoreError::SlugTaken(taken)) => {
            Ok(form_page(&user, form, slug_taken_errors(&taken), Some(note)))
        }
        Err(StoreError::NoteNotFound(_)) => Err(AppError::NotFound(slug)),
        Err(e) => Err(e.into()),
    }
}

/// GET /delete/{slug}/ - Ask before deleting
pub async fn delete_confirm(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let note = owned_note(&state.notes, &user.username, &slug)?;
    Ok(Page::for_user(&user, NoteDeleteContext { note }).into_response())
}

/// POST /delete/{slug}/ - Delete the note permanently
pub async fn delete(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let note = owned_note(&state.notes, &user.username, &slug)?;

    match state.notes.delete(note.id) {
        Ok(_) => Ok(found(&Route::Success.path())),
        Err(StoreError::NoteNotFound(_)) => Err(AppError::NotFound(slug)),
        Err(e) => Err(e.into()),
    }
}

/// GET /done/ - Confirmation after a change
pub async fn success(CurrentUser(user): CurrentUser) -> Response {
    Page::for_user(&user, SuccessContext).into_response()
}

fn form_page(
    user: &User,
    form: NoteForm,
    errors: FormErrors,
    instance: Option<Note>,
) -> Response {
    Page::for_user(
        user,
        NoteFormContext {
            form,
            errors,
            instance,
        },
    )
    .into_response()
}

/// Errors for a slug that the store refused after validation passed,
/// i.e. another request took it in between.
fn slug_taken_errors(slug: &str) -> FormErrors {
    let mut errors = FormErrors::new();
    errors.add("slug", format!("{}{}", slug, SLUG_TAKEN_WARNING));
    errors
}
