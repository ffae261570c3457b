//! Task repository for database operations
//!
//! Every operation is scoped to the owning user. A task that does not
//! exist and a task owned by someone else both surface as `NotFound`, so a
//! caller cannot probe for other users' records.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskFilter, TaskStatus, UpdateTask};

/// Task repository
#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Create a new task repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List a user's tasks, newest first. Soft-deleted tasks are excluded
    /// under every filter.
    pub async fn list_for_user(
        &self,
        owner: Uuid,
        filter: TaskFilter,
    ) -> Result<Vec<Task>, AppError> {
        let rows = match filter.status() {
            Some(status) => {
                sqlx::query(
                    r#"
                    SELECT id, title, description, status, due_date, user_id, created_at, updated_at
                    FROM tasks
                    WHERE user_id = $1 AND status = $2
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(owner)
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, title, description, status, due_date, user_id, created_at, updated_at
                    FROM tasks
                    WHERE user_id = $1 AND status <> 'deleted'
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(owner)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(map_row).collect()
    }

    /// Create a task owned by `owner`
    pub async fn create(&self, owner: Uuid, new_task: &NewTask) -> Result<Task, AppError> {
        let row = sqlx::query(
            r#"
            INSERT INTO tasks (title, description, status, due_date, user_id)
            VALUES ($1, $2, 'pending', $3, $4)
            RETURNING id, title, description, status, due_date, user_id, created_at, updated_at
            "#,
        )
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(new_task.due_date)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        map_row(&row)
    }

    /// Fetch one live task for its owner. `None` covers both a missing row
    /// and another user's row.
    pub async fn find_for_user(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, status, due_date, user_id, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2 AND status <> 'deleted'
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row).transpose()
    }

    /// Update a task's fields; a missing or foreign row fails with
    /// `NotFound`
    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        fields: &UpdateTask,
    ) -> Result<Task, AppError> {
        let row = sqlx::query(
            r#"
            UPDATE tasks
            SET title = $1, description = $2, due_date = $3, status = $4, updated_at = now()
            WHERE id = $5 AND user_id = $6 AND status <> 'deleted'
            RETURNING id, title, description, status, due_date, user_id, created_at, updated_at
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.due_date)
        .bind(fields.status.as_str())
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => map_row(&row),
            None => Err(AppError::NotFound),
        }
    }

    /// Transition a task's status; same ownership-as-existence policy as
    /// `update`
    pub async fn update_status(
        &self,
        owner: Uuid,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Task, AppError> {
        let row = sqlx::query(
            r#"
            UPDATE tasks
            SET status = $1, updated_at = now()
            WHERE id = $2 AND user_id = $3 AND status <> 'deleted'
            RETURNING id, title, description, status, due_date, user_id, created_at, updated_at
            "#,
        )
        .bind(status.as_str())
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => map_row(&row),
            None => Err(AppError::NotFound),
        }
    }

    /// Mark a task deleted. The row survives until the sweeper retires it.
    pub async fn soft_delete(&self, owner: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET status = 'deleted', updated_at = now()
            WHERE id = $1 AND user_id = $2 AND status <> 'deleted'
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    /// Permanently remove soft-deleted tasks whose last update predates the
    /// cutoff. Returns the number of rows removed.
    pub async fn purge_deleted(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE status = 'deleted' AND updated_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Count pending tasks due in the given window
    pub async fn count_due_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM tasks
            WHERE status = 'pending' AND due_date >= $1 AND due_date < $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

fn map_row(row: &PgRow) -> Result<Task, AppError> {
    let status: String = row.get("status");
    let status = TaskStatus::parse(&status)
        .ok_or_else(|| AppError::Internal(anyhow!("Unknown task status: {}", status)))?;

    Ok(Task {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        status,
        due_date: row.get("due_date"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
