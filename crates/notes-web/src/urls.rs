//! Named routes.
//!
//! Handlers and tests build URLs from route names instead of hard-coding
//! paths, so the path table lives only here and in [`crate::router`].

/// Every page the service serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Home,
    List,
    Add,
    Edit(&'a str),
    Detail(&'a str),
    Delete(&'a str),
    Success,
    Login,
    Logout,
    Signup,
}

impl Route<'_> {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::List => "/notes/".to_string(),
            Route::Add => "/add/".to_string(),
            Route::Edit(slug) => format!("/edit/{}/", slug),
            Route::Detail(slug) => format!("/note/{}/", slug),
            Route::Delete(slug) => format!("/delete/{}/", slug),
            Route::Success => "/done/".to_string(),
            Route::Login => "/auth/login/".to_string(),
            Route::Logout => "/auth/logout/".to_string(),
            Route::Signup => "/auth/signup/".to_string(),
        }
    }
}

/// Resolve a route name such as `"notes:edit"` to its path.
///
/// Returns `None` for unknown names or a wrong number of arguments.
pub fn reverse(name: &str, args: &[&str]) -> Option<String> {
    let route = match (name, args) {
        ("notes:home", []) => Route::Home,
        ("notes:list", []) => Route::List,
        ("notes:add", []) => Route::Add,
        ("notes:edit", [slug]) => Route::Edit(*slug),
        ("notes:detail", [slug]) => Route::Detail(*slug),
        ("notes:delete", [slug]) => Route::Delete(*slug),
        ("notes:success", []) => Route::Success,
        ("users:login", []) => Route::Login,
        ("users:logout", []) => Route::Logout,
        ("users:signup", []) => Route::Signup,
        _ => return None,
    };
    Some(route.path())
}
