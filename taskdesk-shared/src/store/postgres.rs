/// PostgreSQL storage backend
///
/// Implements [`UserStore`] and [`TaskStore`] over a sqlx `PgPool`. The
/// schema lives in `migrations/` and is applied by
/// [`crate::db::migrations::run_migrations`].
///
/// Uniqueness and assignee existence are enforced by the database itself
/// (`UNIQUE` constraints and the `tasks.assigned_user_id` foreign key); the
/// resulting constraint violations are mapped to [`StoreError`] variants.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskdesk_shared::store::{PgStore, TaskStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let tasks: Arc<dyn TaskStore> = Arc::new(PgStore::new(pool));
/// let all = tasks.list().await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, TaskStore, UserStore};
use crate::models::{CreateTask, CreateUser, Task, UpdateTask, UpdateUser, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

/// Task columns selected from a `t` (tasks) / `u` (users) join
const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.status, t.assigned_user_id, \
     u.username AS assigned_username, t.created_at, t.updated_at";

/// sqlx-backed store implementing both [`UserStore`] and [`TaskStore`]
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps unique-constraint violations on `users` to [`StoreError::Conflict`]
fn map_user_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            let field = if constraint.contains("email") {
                "email"
            } else {
                "username"
            };
            return StoreError::Conflict { field };
        }
    }

    StoreError::Database(err)
}

/// Maps foreign-key violations on `tasks.assigned_user_id` to [`StoreError::InvalidAssignee`]
fn map_task_write_error(err: sqlx::Error, assignee: Option<Uuid>) -> StoreError {
    if let (sqlx::Error::Database(db_err), Some(assignee)) = (&err, assignee) {
        if db_err.is_foreign_key_violation() {
            return StoreError::InvalidAssignee(assignee);
        }
    }

    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create(&self, data: CreateUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_write_error)
    }

    async fn update(&self, id: Uuid, data: UpdateUser) -> Result<Option<User>, StoreError> {
        if data.is_empty() {
            return UserStore::find_by_id(self, id).await;
        }

        // Build dynamic update query based on which fields are present
        let mut assignments = Vec::new();
        let mut bind_count = 1;

        if data.username.is_some() {
            bind_count += 1;
            assignments.push(format!("username = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            assignments.push(format!("email = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            assignments.push(format!("role = ${}", bind_count));
        }

        let query = format!(
            "UPDATE users SET {} WHERE id = $1 RETURNING {USER_COLUMNS}",
            assignments.join(", ")
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);
        if let Some(username) = data.username {
            q = q.bind(username);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }

        q.fetch_optional(&self.pool)
            .await
            .map_err(map_user_write_error)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| match &err {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    StoreError::UserHasTasks(id)
                }
                _ => StoreError::Database(err),
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks t
            JOIN users u ON u.id = t.assigned_user_id
            WHERE t.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks t
            JOIN users u ON u.id = t.assigned_user_id
            ORDER BY t.created_at ASC, t.id ASC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn list_by_assignee(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks t
            JOIN users u ON u.id = t.assigned_user_id
            WHERE t.assigned_user_id = $1
            ORDER BY t.created_at ASC, t.id ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn create(&self, data: CreateTask) -> Result<Task, StoreError> {
        let assignee = data.assigned_user_id;

        sqlx::query_as::<_, Task>(&format!(
            r#"
            WITH t AS (
                INSERT INTO tasks (title, description, status, assigned_user_id)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {TASK_COLUMNS}
            FROM t
            JOIN users u ON u.id = t.assigned_user_id
            "#
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.assigned_user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_task_write_error(e, Some(assignee)))
    }

    async fn update(&self, id: Uuid, data: UpdateTask) -> Result<Option<Task>, StoreError> {
        let assignee = data.assigned_user_id;

        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.assigned_user_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_user_id = ${}", bind_count));
        }
        query.push_str(" WHERE id = $1 RETURNING *");

        let query = format!(
            r#"
            WITH t AS ({query})
            SELECT {TASK_COLUMNS}
            FROM t
            JOIN users u ON u.id = t.assigned_user_id
            "#
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);
        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(assigned_user_id) = data.assigned_user_id {
            q = q.bind(assigned_user_id);
        }

        q.fetch_optional(&self.pool)
            .await
            .map_err(|e| map_task_write_error(e, assignee))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
