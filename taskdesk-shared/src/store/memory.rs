/// In-memory storage backend
///
/// Holds users and tasks in insertion-ordered vectors behind a single
/// `tokio::sync::RwLock`, so each write is atomic with respect to the
/// uniqueness and reference checks it performs. Used by the test suites and
/// by `STORAGE_BACKEND=memory`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskdesk_shared::models::{CreateUser, Role};
/// use taskdesk_shared::store::{MemoryStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let users: Arc<dyn UserStore> = Arc::new(MemoryStore::new());
/// users
///     .create(CreateUser {
///         username: "admin".to_string(),
///         email: "admin@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         role: Role::Admin,
///     })
///     .await?;
/// assert_eq!(users.count().await?, 1);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, TaskStore, UserStore};
use crate::models::{CreateTask, CreateUser, Task, TaskStatus, UpdateTask, UpdateUser, User};

/// Task row without the joined assignee username
#[derive(Debug, Clone)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    assigned_user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    tasks: Vec<TaskRow>,
}

impl State {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn resolve(&self, row: &TaskRow) -> Option<Task> {
        let assignee = self.user(row.assigned_user_id)?;

        Some(Task {
            id: row.id,
            title: row.title.clone(),
            description: row.description.clone(),
            status: row.status,
            assigned_user_id: row.assigned_user_id,
            assigned_username: assignee.username.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    /// Fails if `username` or `email` belongs to a user other than `except`
    fn check_unique(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        except: Option<Uuid>,
    ) -> Result<(), StoreError> {
        let others = self.users.iter().filter(|u| Some(u.id) != except);

        for other in others {
            if username == Some(other.username.as_str()) {
                return Err(StoreError::Conflict { field: "username" });
            }
            if email == Some(other.email.as_str()) {
                return Err(StoreError::Conflict { field: "email" });
            }
        }

        Ok(())
    }
}

/// Process-local store implementing both [`UserStore`] and [`TaskStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.user(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.state.read().await.users.clone())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.state.read().await.users.len() as i64)
    }

    async fn create(&self, data: CreateUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        state.check_unique(Some(&data.username), Some(&data.email), None)?;

        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            role: data.role,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());

        Ok(user)
    }

    async fn update(&self, id: Uuid, data: UpdateUser) -> Result<Option<User>, StoreError> {
        let mut state = self.state.write().await;
        if state.user(id).is_none() {
            return Ok(None);
        }

        state.check_unique(data.username.as_deref(), data.email.as_deref(), Some(id))?;

        let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(username) = data.username {
            user.username = username;
        }
        if let Some(email) = data.email {
            user.email = email;
        }
        if let Some(role) = data.role {
            user.role = role;
        }

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.tasks.iter().any(|t| t.assigned_user_id == id) {
            return Err(StoreError::UserHasTasks(id));
        }

        let before = state.users.len();
        state.users.retain(|u| u.id != id);

        Ok(state.users.len() < before)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .find(|t| t.id == id)
            .and_then(|row| state.resolve(row)))
    }

    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let state = self.state.read().await;
        Ok(state.tasks.iter().filter_map(|row| state.resolve(row)).collect())
    }

    async fn list_by_assignee(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .filter(|row| row.assigned_user_id == user_id)
            .filter_map(|row| state.resolve(row))
            .collect())
    }

    async fn create(&self, data: CreateTask) -> Result<Task, StoreError> {
        let mut state = self.state.write().await;
        if state.user(data.assigned_user_id).is_none() {
            return Err(StoreError::InvalidAssignee(data.assigned_user_id));
        }

        let row = TaskRow {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            status: data.status,
            assigned_user_id: data.assigned_user_id,
            created_at: Utc::now(),
            updated_at: None,
        };
        state.tasks.push(row.clone());

        state
            .resolve(&row)
            .ok_or(StoreError::InvalidAssignee(row.assigned_user_id))
    }

    async fn update(&self, id: Uuid, data: UpdateTask) -> Result<Option<Task>, StoreError> {
        let mut state = self.state.write().await;

        if let Some(assignee) = data.assigned_user_id {
            if state.user(assignee).is_none() {
                return Err(StoreError::InvalidAssignee(assignee));
            }
        }

        let Some(row) = state.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(title) = data.title {
            row.title = title;
        }
        if let Some(description) = data.description {
            row.description = description;
        }
        if let Some(status) = data.status {
            row.status = status;
        }
        if let Some(assignee) = data.assigned_user_id {
            row.assigned_user_id = assignee;
        }
        row.updated_at = Some(Utc::now());

        let row = row.clone();
        Ok(state.resolve(&row))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);

        Ok(state.tasks.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use std::sync::Arc;

    fn new_user(username: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "$argon2id$test".to_string(),
            role: Role::User,
        }
    }

    fn stores() -> (Arc<dyn UserStore>, Arc<dyn TaskStore>) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), store)
    }

    fn new_task(title: &str, assignee: Uuid) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            description: None,
            status: TaskStatus::Pending,
            assigned_user_id: assignee,
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email_conflicts() {
        let (users, _) = stores();
        users.create(new_user("alice")).await.unwrap();

        let mut same_name = new_user("alice");
        same_name.email = "other@example.com".to_string();
        let err = users.create(same_name).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { field: "username" }));

        let mut same_email = new_user("bob");
        same_email.email = "alice@example.com".to_string();
        let err = users.create(same_email).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { field: "email" }));

        assert_eq!(users.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_user_conflict_leaves_record_unchanged() {
        let (users, _) = stores();
        users.create(new_user("alice")).await.unwrap();
        let bob = users.create(new_user("bob")).await.unwrap();

        let err = users
            .update(
                bob.id,
                UpdateUser {
                    username: Some("carol".to_string()),
                    email: Some("alice@example.com".to_string()),
                    role: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { field: "email" }));

        let unchanged = users.find_by_id(bob.id).await.unwrap().unwrap();
        assert_eq!(unchanged, bob);
    }

    #[tokio::test]
    async fn test_update_user_may_keep_own_values() {
        let (users, _) = stores();
        let alice = users.create(new_user("alice")).await.unwrap();

        let updated = users
            .update(
                alice.id,
                UpdateUser {
                    username: Some("alice".to_string()),
                    email: Some("alice@example.com".to_string()),
                    role: Some(Role::Admin),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.role, Role::Admin);
        assert!(users.update(Uuid::new_v4(), UpdateUser::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_task_lifecycle() {
        let (users, tasks) = stores();
        let alice = users.create(new_user("alice")).await.unwrap();

        let task = tasks.create(new_task("Write docs", alice.id)).await.unwrap();
        assert_eq!(task.assigned_username, "alice");
        assert!(task.updated_at.is_none());

        let updated = tasks
            .update(
                task.id,
                UpdateTask {
                    status: Some(TaskStatus::InProgress),
                    description: Some(Some("First draft".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.description.as_deref(), Some("First draft"));
        assert_eq!(updated.title, "Write docs");
        assert!(updated.updated_at.is_some());

        assert!(tasks.delete(task.id).await.unwrap());
        assert!(!tasks.delete(task.id).await.unwrap());
        assert!(tasks.find_by_id(task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_task_assignee_must_exist() {
        let (users, tasks) = stores();
        let alice = users.create(new_user("alice")).await.unwrap();
        let ghost = Uuid::new_v4();

        let err = tasks.create(new_task("Orphan", ghost)).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidAssignee(id) if id == ghost));

        let task = tasks.create(new_task("Real", alice.id)).await.unwrap();
        let err = tasks
            .update(
                task.id,
                UpdateTask {
                    assigned_user_id: Some(ghost),
                    title: Some("Changed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidAssignee(_)));

        let unchanged = tasks.find_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(unchanged.title, "Real");
    }

    #[tokio::test]
    async fn test_list_by_assignee_is_exact_and_ordered() {
        let (users, tasks) = stores();
        let alice = users.create(new_user("alice")).await.unwrap();
        let bob = users.create(new_user("bob")).await.unwrap();

        for (title, owner) in [("a1", alice.id), ("b1", bob.id), ("a2", alice.id), ("a3", alice.id)] {
            tasks.create(new_task(title, owner)).await.unwrap();
        }

        let titles: Vec<String> = tasks
            .list_by_assignee(alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["a1", "a2", "a3"]);

        assert_eq!(tasks.list().await.unwrap().len(), 4);
        assert!(tasks.list_by_assignee(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_with_tasks_cannot_be_deleted() {
        let (users, tasks) = stores();
        let alice = users.create(new_user("alice")).await.unwrap();
        let task = tasks.create(new_task("Pinned", alice.id)).await.unwrap();

        let err = users.delete(alice.id).await.unwrap_err();
        assert!(matches!(err, StoreError::UserHasTasks(_)));

        tasks.delete(task.id).await.unwrap();
        assert!(users.delete(alice.id).await.unwrap());
        assert!(!users.delete(alice.id).await.unwrap());
    }
}
