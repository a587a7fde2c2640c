use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::model::{NewTask, Task};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row-level access to the tasks table. Ownership checks live in the
/// service; the store only filters where it is told to.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts one row and returns it as stored.
    async fn insert(&self, task: NewTask) -> Result<Task, StoreError>;

    /// All tasks owned by `user_id`, newest first.
    async fn find_many(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError>;

    async fn find_unique(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Returns false when no row matched.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
