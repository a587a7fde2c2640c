use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::TaskError;
use crate::routes::middleware_auth::Caller;
use crate::state::AppState;
use crate::tasks::Task;

#[derive(Deserialize)]
pub struct CreateTask {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteTask {
    pub id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<Vec<Task>>, TaskError> {
    let tasks = state.tasks.list(&caller).await?;
    Ok(Json(tasks))
}

pub async fn create(
    State(state): State<AppState>,
    Caller(caller): Caller,
    body: Result<Json<CreateTask>, JsonRejection>,
) -> Result<impl IntoResponse, TaskError> {
    let Json(body) = body.map_err(|e| {
        debug!(error = %e, "unreadable task body");
        TaskError::Validation("Title and description required")
    })?;

    let task = state
        .tasks
        .create(&caller, body.title, body.description)
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn delete(
    State(state): State<AppState>,
    Caller(caller): Caller,
    query: Result<Query<DeleteTask>, QueryRejection>,
) -> Result<StatusCode, TaskError> {
    let Query(query) = query.map_err(|e| {
        debug!(error = %e, "unreadable delete query");
        TaskError::Validation("Task ID required")
    })?;
    state.tasks.delete(&caller, query.id.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}
