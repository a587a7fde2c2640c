use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Failures of the task endpoints, as seen by the caller.
///
/// "Not found" and "owned by someone else" share one variant so a caller
/// cannot probe for other users' task ids.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("Unauthorized")]
    Unauthenticated,

    #[error("{0}")]
    Validation(&'static str),

    #[error("Not found or not allowed")]
    NotFoundOrForbidden,

    /// Message is the public one; the cause is logged where it happened.
    #[error("{0}")]
    Internal(&'static str),
}

impl TaskError {
    pub fn status(&self) -> StatusCode {
        match self {
            TaskError::Unauthenticated => StatusCode::UNAUTHORIZED,
            TaskError::Validation(_) => StatusCode::BAD_REQUEST,
            TaskError::NotFoundOrForbidden => StatusCode::NOT_FOUND,
            TaskError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
