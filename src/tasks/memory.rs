use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use super::model::{NewTask, Task};
use super::store::{StoreError, TaskStore};

/// Vec-backed store for tests. Counts every call so tests can assert that
/// rejected requests never reached storage.
#[derive(Default)]
pub struct MemoryTaskStore {
    rows: Mutex<Vec<Task>>,
    calls: AtomicUsize,
}

impl MemoryTaskStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        self.touch();
        let row = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            user_id: task.user_id,
            created_at: Utc::now(),
            due_date: None,
            status: None,
            priority: None,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn find_many(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        self.touch();
        // Insertion order reversed first so ties on created_at stay newest first.
        let mut found: Vec<Task> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_unique(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        self.touch();
        Ok(self.rows.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| t.id != id);
        Ok(rows.len() < before)
    }
}

/// Fails every call, for exercising the 500 path.
pub struct BrokenTaskStore;

#[async_trait]
impl TaskStore for BrokenTaskStore {
    async fn insert(&self, _task: NewTask) -> Result<Task, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn find_many(&self, _user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn find_unique(&self, _id: Uuid) -> Result<Option<Task>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}

/// Never answers, for exercising the request timeout.
pub struct StalledTaskStore;

#[async_trait]
impl TaskStore for StalledTaskStore {
    async fn insert(&self, _task: NewTask) -> Result<Task, StoreError> {
        std::future::pending().await
    }

    async fn find_many(&self, _user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        std::future::pending().await
    }

    async fn find_unique(&self, _id: Uuid) -> Result<Option<Task>, StoreError> {
        std::future::pending().await
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, StoreError> {
        std::future::pending().await
    }
}

/// Finds the task it was given, but loses every delete to someone else.
pub struct RacedTaskStore {
    pub task: Task,
}

#[async_trait]
impl TaskStore for RacedTaskStore {
    async fn insert(&self, _task: NewTask) -> Result<Task, StoreError> {
        Ok(self.task.clone())
    }

    async fn find_many(&self, _user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        Ok(vec![])
    }

    async fn find_unique(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(Some(self.task.clone()).filter(|t| t.id == id))
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, StoreError> {
        Ok(false)
    }
}
