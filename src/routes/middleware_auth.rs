use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::error::TaskError;
use crate::identity::Identity;
use crate::state::AppState;

/// The authenticated caller, placed in request extensions by [`require_auth`].
pub struct Caller(pub Identity);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = TaskError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .map(Caller)
            .ok_or(TaskError::Unauthenticated)
    }
}

/// Runs before any extractor of the wrapped handlers, so an unauthenticated
/// request is rejected before its body or query is looked at.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, TaskError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let identity = state.tasks.authenticate(authorization).await?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
