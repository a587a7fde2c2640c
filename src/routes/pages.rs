//! Placeholder pages. The real UI is served by a separate rendering layer;
//! these exist so the session gate has something to guard.

use axum::{http::StatusCode, response::Html};

pub async fn home() -> Html<&'static str> {
    Html("<!doctype html><title>Tasks</title><h1>My tasks</h1>")
}

pub async fn login() -> Html<&'static str> {
    Html("<!doctype html><title>Sign in</title><h1>Sign in</h1>")
}

pub async fn signup() -> Html<&'static str> {
    Html("<!doctype html><title>Sign up</title><h1>Create an account</h1>")
}

pub async fn not_found() -> (StatusCode, Html<&'static str>) {
    (
        StatusCode::NOT_FOUND,
        Html("<!doctype html><title>Not found</title><h1>Page not found</h1>"),
    )
}
