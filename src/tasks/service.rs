use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::model::{NewTask, Task};
use super::store::{StoreError, TaskStore};
use crate::error::TaskError;
use crate::identity::{Identity, IdentityProvider};

const FETCH_FAILED: &str = "Failed to fetch tasks";
const CREATE_FAILED: &str = "Failed to create task";
const DELETE_FAILED: &str = "Failed to delete task";

/// Owner-scoped task operations. Every operation takes an [`Identity`]
/// obtained from [`TaskService::authenticate`], and never touches a row
/// whose `user_id` differs from it.
pub struct TaskService {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn TaskStore>,
    timeout: Duration,
}

impl TaskService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn TaskStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            identity,
            store,
            timeout,
        }
    }

    /// Resolves an `Authorization` header value to a caller. A missing or
    /// malformed header, a rejected token and a provider failure all come
    /// back as the same `Unauthenticated`.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Identity, TaskError> {
        let token = bearer_token(authorization).ok_or(TaskError::Unauthenticated)?;

        match timeout(self.timeout, self.identity.validate_token(token)).await {
            Ok(Ok(identity)) => Ok(identity),
            Ok(Err(e)) => {
                debug!(error = %e, "bearer token rejected");
                Err(TaskError::Unauthenticated)
            }
            Err(_) => {
                warn!("identity provider timed out");
                Err(TaskError::Unauthenticated)
            }
        }
    }

    pub async fn list(&self, caller: &Identity) -> Result<Vec<Task>, TaskError> {
        self.bounded(FETCH_FAILED, self.store.find_many(caller.id))
            .await
    }

    pub async fn create(
        &self,
        caller: &Identity,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Task, TaskError> {
        let title = title.filter(|t| !t.trim().is_empty());
        let description = description.filter(|d| !d.is_empty());

        let (Some(title), Some(description)) = (title, description) else {
            return Err(TaskError::Validation("Title and description required"));
        };

        let task = self
            .bounded(
                CREATE_FAILED,
                self.store.insert(NewTask {
                    title,
                    description,
                    user_id: caller.id,
                }),
            )
            .await?;

        info!(task_id = %task.id, user_id = %caller.id, "task created");
        Ok(task)
    }

    /// Removes a task the caller owns. A task that does not exist and a task
    /// that belongs to someone else produce the same error.
    pub async fn delete(&self, caller: &Identity, task_id: Option<&str>) -> Result<(), TaskError> {
        let task_id = task_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(TaskError::Validation("Task ID required"))?;

        // A malformed id cannot name any row.
        let id = Uuid::parse_str(task_id).map_err(|_| TaskError::NotFoundOrForbidden)?;

        let task = self
            .bounded(DELETE_FAILED, self.store.find_unique(id))
            .await?;

        match task {
            Some(task) if task.user_id == caller.id => {}
            _ => return Err(TaskError::NotFoundOrForbidden),
        }

        // A concurrent delete can win between the lookup and here.
        if !self.bounded(DELETE_FAILED, self.store.delete(id)).await? {
            return Err(TaskError::NotFoundOrForbidden);
        }

        info!(task_id = %id, user_id = %caller.id, "task deleted");
        Ok(())
    }

    async fn bounded<T, F>(&self, failure: &'static str, op: F) -> Result<T, TaskError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match timeout(self.timeout, op).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!(error = %e, "{}", failure);
                Err(TaskError::Internal(failure))
            }
            Err(_) => {
                error!(timeout = ?self.timeout, "{}: task store timed out", failure);
                Err(TaskError::Internal(failure))
            }
        }
    }
}

fn bearer_token(header: Option<&str>) -> Option<&str> {
    header?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
