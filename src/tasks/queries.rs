use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::model::{NewTask, Task};
use super::store::{StoreError, TaskStore};

pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        let rec = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, title, description, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, user_id, created_at, due_date, status, priority
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(rec)
    }

    async fn find_many(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let rec = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, user_id, created_at, due_date, status, priority
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rec)
    }

    async fn find_unique(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let rec = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, user_id, created_at, due_date, status, priority
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rec)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
