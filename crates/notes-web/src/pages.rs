//! Page contexts and their rendering.
//!
//! Each page is a typed context struct implementing [`Template`]. Wrapping it
//! in a [`Page`] renders the HTML and also stores the context in the response
//! extensions, where callers can read `object_list`, `form` and friends back.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use notes_core::{FormErrors, LoginForm, Note, NoteForm, SignupForm, User};

use crate::html::{self, escape};
use crate::urls::Route;

/// Something that renders as the body of a page.
pub trait Template: Clone + Send + Sync + 'static {
    fn title(&self) -> String;
    fn body(&self) -> String;
}

/// A rendered page, ready to be returned from a handler.
pub struct Page<T> {
    status: StatusCode,
    username: Option<String>,
    context: T,
}

impl<T: Template> Page<T> {
    /// A page for an anonymous visitor.
    pub fn new(context: T) -> Self {
        Self {
            status: StatusCode::OK,
            username: None,
            context,
        }
    }

    /// A page for a logged-in user.
    pub fn for_user(user: &User, context: T) -> Self {
        Self::new(context).viewer(Some(user))
    }

    /// Set who is viewing the page (shown in the navigation).
    pub fn viewer(mut self, user: Option<&User>) -> Self {
        self.username = user.map(|u| u.username.clone());
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl<T: Template> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        let body = html::layout(
            &self.context.title(),
            self.username.as_deref(),
            &self.context.body(),
        );
        let mut response = (self.status, Html(body)).into_response();
        response.extensions_mut().insert(self.context);
        response
    }
}

// --- Notes ---

#[derive(Debug, Clone)]
pub struct HomeContext {
    pub username: Option<String>,
}

impl Template for HomeContext {
    fn title(&self) -> String {
        "Notes".to_string()
    }

    fn body(&self) -> String {
        match &self.username {
            Some(name) => format!(
                r#"<p>Welcome back, {}.</p>
                <div class="actions">
                    <a href="{}">My notes</a>
                    <a href="{}">Add a note</a>
                </div>"#,
                escape(name),
                Route::List.path(),
                Route::Add.path(),
            ),
            None => format!(
                r#"<p>Keep personal notes that only you can see.</p>
                <div class="actions">
                    <a href="{}">Log in</a>
                    <a href="{}">Sign up</a>
                </div>"#,
                Route::Login.path(),
                Route::Signup.path(),
            ),
        }
    }
}

/// The current user's notes, in creation order.
#[derive(Debug, Clone)]
pub struct NoteListContext {
    pub object_list: Vec<Note>,
}

impl Template for NoteListContext {
    fn title(&self) -> String {
        "My notes".to_string()
    }

    fn body(&self) -> String {
        if self.object_list.is_empty() {
            return format!(
                r#"<p>You have no notes yet. <a href="{}">Add one</a>.</p>"#,
                Route::Add.path()
            );
        }

        let items: String = self
            .object_list
            .iter()
            .map(|note| {
                format!(
                    r#"<li><a href="{}">{}</a></li>"#,
                    Route::Detail(&note.slug).path(),
                    escape(&note.title)
                )
            })
            .collect();
        format!(r#"<ol class="notes">{}</ol>"#, items)
    }
}

/// The create/edit form. `instance` is the note being edited, if any.
#[derive(Debug, Clone)]
pub struct NoteFormContext {
    pub form: NoteForm,
    pub errors: FormErrors,
    pub instance: Option<Note>,
}

impl NoteFormContext {
    pub fn unbound() -> Self {
        Self {
            form: NoteForm::default(),
            errors: FormErrors::new(),
            instance: None,
        }
    }

    pub fn for_note(note: Note) -> Self {
        Self {
            form: NoteForm::from_note(&note),
            errors: FormErrors::new(),
            instance: Some(note),
        }
    }
}

impl Template for NoteFormContext {
    fn title(&self) -> String {
        match &self.instance {
            Some(_) => "Edit note".to_string(),
            None => "Add note".to_string(),
        }
    }

    fn body(&self) -> String {
        let action = match &self.instance {
            Some(note) => Route::Edit(&note.slug).path(),
            None => Route::Add.path(),
        };
        format!(
            r#"<form method="post" action="{action}">
                {non_field}
                {title}
                {text}
                {slug}
                <button type="submit">Save</button>
            </form>"#,
            action = action,
            non_field = html::non_field_errors(&self.errors),
            title = html::input_field("title", "Title", "text", &self.form.title, &self.errors),
            text = html::textarea_field("text", "Text", &self.form.text, &self.errors),
            slug = html::input_field(
                "slug",
                "Slug (leave blank to build it from the title)",
                "text",
                &self.form.slug,
                &self.errors
            ),
        )
    }
}

#[derive(Debug, Clone)]
pub struct NoteDetailContext {
    pub note: Note,
}

impl Template for NoteDetailContext {
    fn title(&self) -> String {
        self.note.title.clone()
    }

    fn body(&self) -> String {
        format!(
            r#"<div class="note-text">{text}</div>
            <div class="actions">
                <a href="{edit}">Edit</a>
                <a href="{delete}">Delete</a>
            </div>"#,
            text = escape(&self.note.text),
            edit = Route::Edit(&self.note.slug).path(),
            delete = Route::Delete(&self.note.slug).path(),
        )
    }
}

/// Confirmation before deleting `note`.
#[derive(Debug, Clone)]
pub struct NoteDeleteContext {
    pub note: Note,
}

impl Template for NoteDeleteContext {
    fn title(&self) -> String {
        "Delete note".to_string()
    }

    fn body(&self) -> String {
        format!(
            r#"<p>Delete "{title}" permanently?</p>
            <form method="post" action="{action}">
                <button type="submit" class="danger">Delete</button>
            </form>"#,
            title = escape(&self.note.title),
            action = Route::Delete(&self.note.slug).path(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct SuccessContext;

impl Template for SuccessContext {
    fn title(&self) -> String {
        "Done".to_string()
    }

    fn body(&self) -> String {
        format!(
            r#"<p>Your changes were saved.</p>
            <div class="actions"><a href="{}">Back to my notes</a></div>"#,
            Route::List.path()
        )
    }
}

// --- Users ---

/// The login form. The password is never echoed back.
#[derive(Debug, Clone)]
pub struct LoginContext {
    pub form: LoginForm,
    pub errors: FormErrors,
}

impl LoginContext {
    pub fn new(next: Option<String>) -> Self {
        Self {
            form: LoginForm {
                next,
                ..LoginForm::default()
            },
            errors: FormErrors::new(),
        }
    }
}

impl Template for LoginContext {
    fn title(&self) -> String {
        "Log in".to_string()
    }

    fn body(&self) -> String {
        let next = self
            .form
            .next
            .as_deref()
            .map(|n| format!(r#"<input type="hidden" name="next" value="{}">"#, escape(n)))
            .unwrap_or_default();
        format!(
            r#"<form method="post" action="{action}">
                {non_field}
                {username}
                {password}
                {next}
                <button type="submit">Log in</button>
            </form>
            <p>No account? <a href="{signup}">Sign up</a>.</p>"#,
            action = Route::Login.path(),
            non_field = html::non_field_errors(&self.errors),
            username = html::input_field("username", "Username", "text", &self.form.username, &self.errors),
            password = html::input_field("password", "Password", "password", "", &self.errors),
            next = next,
            signup = Route::Signup.path(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct LoggedOutContext;

impl Template for LoggedOutContext {
    fn title(&self) -> String {
        "Logged out".to_string()
    }

    fn body(&self) -> String {
        format!(
            r#"<p>You have been logged out.</p>
            <div class="actions"><a href="{}">Log in again</a></div>"#,
            Route::Login.path()
        )
    }
}

/// The signup form. Passwords are never echoed back.
#[derive(Debug, Clone)]
pub struct SignupContext {
    pub form: SignupForm,
    pub errors: FormErrors,
}

impl Template for SignupContext {
    fn title(&self) -> String {
        "Sign up".to_string()
    }

    fn body(&self) -> String {
        format!(
            r#"<form method="post" action="{action}">
                {non_field}
                {username}
                {password1}
                {password2}
                <button type="submit">Sign up</button>
            </form>"#,
            action = Route::Signup.path(),
            non_field = html::non_field_errors(&self.errors),
            username = html::input_field("username", "Username", "text", &self.form.username, &self.errors),
            password1 = html::input_field("password1", "Password", "password", "", &self.errors),
            password2 = html::input_field(
                "password2",
                "Password confirmation",
                "password",
                "",
                &self.errors
            ),
        )
    }
}

// --- Errors ---

#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub heading: String,
    pub message: String,
}

impl Template for ErrorContext {
    fn title(&self) -> String {
        self.heading.clone()
    }

    fn body(&self) -> String {
        format!("<p>{}</p>", escape(&self.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: u64, slug: &str) -> Note {
        Note {
            id,
            title: format!("Запись {}", id),
            text: "Текст".to_string(),
            slug: slug.to_string(),
            author: "author".to_string(),
        }
    }

    #[test]
    fn test_page_exposes_context() {
        let response = Page::new(NoteListContext {
            object_list: vec![note(1, "a"), note(2, "b")],
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let context = response.extensions().get::<NoteListContext>().unwrap();
        assert_eq!(context.object_list.len(), 2);
    }

    #[test]
    fn test_page_status() {
        let response = Page::new(ErrorContext {
            heading: "Not found".to_string(),
            message: "missing".to_string(),
        })
        .status(StatusCode::NOT_FOUND)
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_list_links_to_details() {
        let body = NoteListContext {
            object_list: vec![note(1, "zapis-1")],
        }
        .body();
        assert!(body.contains(r#"href="/note/zapis-1/""#));
        assert!(body.contains("Запись 1"));
    }

    #[test]
    fn test_form_posts_to_edit_for_instance() {
        let body = NoteFormContext::for_note(note(3, "zapis-3")).body();
        assert!(body.contains(r#"action="/edit/zapis-3/""#));
        assert!(body.contains(r#"value="zapis-3""#));

        let body = NoteFormContext::unbound().body();
        assert!(body.contains(r#"action="/add/""#));
    }

    #[test]
    fn test_login_keeps_next() {
        let body = LoginContext::new(Some("/notes/".to_string())).body();
        assert!(body.contains(r#"name="next" value="/notes/""#));
    }
}
