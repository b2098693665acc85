/// Task CRUD filtered by ownership
///
/// Admins see and change everything. Users see only the tasks assigned to
/// them and may change nothing but the status of those tasks; any other
/// requested change is dropped before it reaches the store.

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ServiceError, Validator};
use crate::auth::actor::Actor;
use crate::auth::policy::{self, Denial, TaskScope};
use crate::models::{CreateTask, Task, TaskDto, TaskStatus, UpdateTask};
use crate::store::{TaskStore, UserStore};

const TITLE_MAX: usize = 200;

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,

    /// Defaults to [`TaskStatus::Pending`]
    pub status: Option<TaskStatus>,

    /// Required; `None` is reported as a validation error
    pub assigned_user_id: Option<Uuid>,
}

fn task_not_found() -> ServiceError {
    ServiceError::NotFound("Task not found".to_string())
}

fn denied(denial: Denial, action: &str) -> ServiceError {
    match denial {
        Denial::Forbidden => ServiceError::Forbidden(format!("Not allowed to {}", action)),
        Denial::NotFound => task_not_found(),
    }
}

/// Blank descriptions are stored as absent
fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Task operations guarded by the authorization policy
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    users: Arc<dyn UserStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>, users: Arc<dyn UserStore>) -> Self {
        Self { tasks, users }
    }

    /// Lists the tasks visible to the actor
    pub async fn list(&self, actor: &Actor) -> Result<Vec<TaskDto>, ServiceError> {
        let tasks = match policy::task_scope(actor) {
            TaskScope::All => self.tasks.list().await?,
            TaskScope::AssignedTo(user_id) => self.tasks.list_by_assignee(user_id).await?,
        };

        Ok(tasks.into_iter().map(TaskDto::from).collect())
    }

    /// Reads one task
    ///
    /// Tasks the actor may not see are reported as missing.
    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<TaskDto, ServiceError> {
        let task = self.visible_task(actor, id).await?;
        Ok(TaskDto::from(task))
    }

    /// Creates a task (Admin only)
    ///
    /// # Errors
    ///
    /// - `Forbidden` for non-Admin actors, whatever the input
    /// - `Validation` for a blank title or a missing or unknown assignee
    pub async fn create(&self, actor: &Actor, input: NewTask) -> Result<TaskDto, ServiceError> {
        policy::can_create_task(actor).map_err(|d| denied(d, "create tasks"))?;

        let title = input.title.trim().to_string();
        let mut v = Validator::new();
        v.text("title", &title, TITLE_MAX);
        if input.assigned_user_id.is_none() {
            v.push("assignedUserId", "assignedUserId is required");
        }
        v.finish()?;

        let assigned_user_id = input
            .assigned_user_id
            .ok_or_else(|| ServiceError::invalid("assignedUserId", "assignedUserId is required"))?;
        self.require_assignee(assigned_user_id).await?;

        let task = self
            .tasks
            .create(CreateTask {
                title,
                description: normalize_description(input.description),
                status: input.status.unwrap_or_default(),
                assigned_user_id,
            })
            .await?;

        info!(
            task_id = %task.id,
            assigned_user_id = %task.assigned_user_id,
            created_by = %actor.user_id,
            "Task created"
        );
        Ok(TaskDto::from(task))
    }

    /// Updates a task
    ///
    /// Admins may change every field. The assignee may change the status;
    /// the rest of their request is ignored. When nothing applicable remains
    /// the task is returned as is.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the task doesn't exist or is assigned to someone
    ///   else and the actor is a User
    /// - `Validation` for a blank title or an unknown assignee
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: UpdateTask,
    ) -> Result<TaskDto, ServiceError> {
        let current = self.tasks.find_by_id(id).await?.ok_or_else(task_not_found)?;

        let rights = policy::task_update_rights(actor, current.assigned_user_id)
            .map_err(|d| denied(d, "update this task"))?;
        let requested = changes.clone();
        let mut changes = rights.filter(changes);
        if changes != requested {
            debug!(task_id = %id, actor = %actor.user_id, "Dropped fields outside the actor's rights");
        }

        if let Some(title) = changes.title.take() {
            let title = title.trim().to_string();
            let mut v = Validator::new();
            v.text("title", &title, TITLE_MAX);
            v.finish()?;
            changes.title = Some(title);
        }
        changes.description = changes.description.map(normalize_description);

        if let Some(assignee) = changes.assigned_user_id {
            if assignee != current.assigned_user_id {
                self.require_assignee(assignee).await?;
            }
        }

        if changes.is_empty() {
            return Ok(TaskDto::from(current));
        }

        let task = self.tasks.update(id, changes).await?.ok_or_else(task_not_found)?;

        info!(task_id = %task.id, status = %task.status, updated_by = %actor.user_id, "Task updated");
        Ok(TaskDto::from(task))
    }

    /// Deletes a task (Admin only)
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
        policy::can_delete_task(actor).map_err(|d| denied(d, "delete tasks"))?;

        if !self.tasks.delete(id).await? {
            return Err(task_not_found());
        }

        info!(task_id = %id, deleted_by = %actor.user_id, "Task deleted");
        Ok(())
    }

    async fn visible_task(&self, actor: &Actor, id: Uuid) -> Result<Task, ServiceError> {
        let task = self.tasks.find_by_id(id).await?.ok_or_else(task_not_found)?;
        policy::can_read_task(actor, task.assigned_user_id).map_err(|d| denied(d, "view this task"))?;
        Ok(task)
    }

    async fn require_assignee(&self, user_id: Uuid) -> Result<(), ServiceError> {
        match self.users.find_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::invalid(
                "assignedUserId",
                "Assigned user does not exist",
            )),
        }
    }
}
