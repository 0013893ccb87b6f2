//! Inline HTML building blocks shared by every page

use notes_core::FormErrors;

use crate::urls::Route;

/// Wrap a page body in the site layout.
///
/// The navigation shows the note links and logout for `username`, or the
/// login and signup links for anonymous visitors.
pub fn layout(title: &str, username: Option<&str>, body: &str) -> String {
    let nav = match username {
        Some(name) => format!(
            r#"<a href="{home}">Home</a>
            <a href="{list}">My notes</a>
            <a href="{add}">Add note</a>
            <form method="post" action="{logout}" class="inline">
                <span class="user">{name}</span>
                <button type="submit" class="link">Log out</button>
            </form>"#,
            home = Route::Home.path(),
            list = Route::List.path(),
            add = Route::Add.path(),
            logout = Route::Logout.path(),
            name = escape(name),
        ),
        None => format!(
            r#"<a href="{home}">Home</a>
            <a href="{login}">Log in</a>
            <a href="{signup}">Sign up</a>"#,
            home = Route::Home.path(),
            login = Route::Login.path(),
            signup = Route::Signup.path(),
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Notes</title>
    <style>{css}</style>
</head>
<body>
    <nav>
        {nav}
    </nav>
    <main class="container">
        <h1>{title}</h1>
        {body}
    </main>
</body>
</html>"#,
        title = escape(title),
        css = CSS_STYLES,
        nav = nav,
        body = body,
    )
}

/// A labelled single-line input with its error messages.
pub fn input_field(
    name: &str,
    label: &str,
    input_type: &str,
    value: &str,
    errors: &FormErrors,
) -> String {
    format!(
        r#"<div class="field">
            <label for="id_{name}">{label}</label>
            <input type="{input_type}" id="id_{name}" name="{name}" value="{value}">
            {errors}
        </div>"#,
        name = name,
        label = escape(label),
        input_type = input_type,
        value = escape(value),
        errors = error_list(errors.get(name)),
    )
}

/// A labelled textarea with its error messages.
pub fn textarea_field(name: &str, label: &str, value: &str, errors: &FormErrors) -> String {
    format!(
        r#"<div class="field">
            <label for="id_{name}">{label}</label>
            <textarea id="id_{name}" name="{name}" rows="8">{value}</textarea>
            {errors}
        </div>"#,
        name = name,
        label = escape(label),
        value = escape(value),
        errors = error_list(errors.get(name)),
    )
}

/// Errors that belong to the form as a whole.
pub fn non_field_errors(errors: &FormErrors) -> String {
    error_list(errors.get(FormErrors::NON_FIELD))
}

fn error_list(messages: &[String]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>", escape(m)))
        .collect();
    format!(r#"<ul class="errors">{}</ul>"#, items)
}

/// Escape HTML special characters
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

const CSS_STYLES: &str = r#"
* {
    box-sizing: border-box;
}
body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    background: #f6f5f1;
    color: #222;
    margin: 0;
}
nav {
    display: flex;
    gap: 16px;
    align-items: center;
    padding: 12px 24px;
    background: #2f3e46;
}
nav a, nav .user, nav button.link {
    color: #fff;
    text-decoration: none;
    font-size: 15px;
}
nav form.inline {
    margin-left: auto;
    display: flex;
    gap: 12px;
    align-items: center;
}
.container {
    max-width: 720px;
    margin: 32px auto;
    padding: 32px;
    background: #fff;
    border-radius: 8px;
    box-shadow: 0 2px 10px rgba(0,0,0,0.08);
}
h1 {
    margin: 0 0 20px 0;
    font-size: 26px;
}
.field {
    margin-bottom: 18px;
}
label {
    display: block;
    margin-bottom: 6px;
    font-size: 14px;
    color: #555;
}
input, textarea {
    width: 100%;
    padding: 10px;
    border: 1px solid #ccc;
    border-radius: 6px;
    font-size: 15px;
    font-family: inherit;
}
button {
    padding: 10px 18px;
    background: #52796f;
    color: #fff;
    border: none;
    border-radius: 6px;
    font-size: 15px;
    cursor: pointer;
}
button.link {
    background: none;
    padding: 0;
}
button.danger {
    background: #b5403a;
}
ul.errors {
    color: #b5403a;
    margin: 6px 0 0 0;
    padding-left: 18px;
    font-size: 14px;
}
ol.notes li {
    margin-bottom: 8px;
}
.note-text {
    white-space: pre-wrap;
    line-height: 1.5;
}
.actions {
    display: flex;
    gap: 12px;
    margin-top: 24px;
}
"#;
