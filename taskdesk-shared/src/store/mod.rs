/// Storage abstractions for users and tasks
///
/// The API never talks to a database driver directly: it holds
/// `Arc<dyn UserStore>` and `Arc<dyn TaskStore>` and the backend is chosen at
/// startup.
///
/// # Backends
///
/// - [`postgres::PgStore`]: PostgreSQL via sqlx (production)
/// - [`memory::MemoryStore`]: process-local maps (tests, demos)
///
/// Both enforce the same write-time rules:
/// - username and email are unique across users ([`StoreError::Conflict`])
/// - a task's assignee must exist ([`StoreError::InvalidAssignee`])
/// - a user with assigned tasks cannot be deleted ([`StoreError::UserHasTasks`])
///
/// Listings are ordered by creation time, then id.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{CreateTask, CreateUser, Task, UpdateTask, UpdateUser, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique field collides with a different record
    #[error("{field} already exists")]
    Conflict { field: &'static str },

    /// The referenced assignee does not exist
    #[error("Assigned user {0} does not exist")]
    InvalidAssignee(Uuid),

    /// The user is still referenced by tasks
    #[error("User {0} still has assigned tasks")]
    UserHasTasks(Uuid),

    /// Backend failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Credential store
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;

    /// Inserts a user, stamping `created_at`
    async fn create(&self, data: CreateUser) -> Result<User, StoreError>;

    /// Applies non-None fields; `Ok(None)` if the user doesn't exist
    async fn update(&self, id: Uuid, data: UpdateUser) -> Result<Option<User>, StoreError>;

    /// Returns true if a user was deleted
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Backend health check
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Task store
///
/// Every returned [`Task`] has its assignee username resolved.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    async fn list(&self) -> Result<Vec<Task>, StoreError>;

    /// Tasks assigned to exactly this user
    async fn list_by_assignee(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError>;

    /// Inserts a task, stamping `created_at`
    async fn create(&self, data: CreateTask) -> Result<Task, StoreError>;

    /// Applies non-None fields and stamps `updated_at`; `Ok(None)` if the task doesn't exist
    async fn update(&self, id: Uuid, data: UpdateTask) -> Result<Option<Task>, StoreError>;

    /// Returns true if a task was deleted
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
