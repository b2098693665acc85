/// Task endpoints
///
/// Listing and reads are filtered by role; creates and deletes are Admin
/// only; the assignee of a task may update its status.
///
/// - `GET /api/tasks`
/// - `POST /api/tasks`
/// - `GET /api/tasks/:id`
/// - `PUT /api/tasks/:id`
/// - `DELETE /api/tasks/:id`

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Deserializer};
use taskdesk_shared::{
    auth::actor::Actor,
    models::{TaskDto, TaskStatus, UpdateTask},
    service::NewTask,
};
use uuid::Uuid;

/// Create task request
///
/// Fields are checked by [`taskdesk_shared::service::TaskService::create`]
/// once the caller is known to be an Admin.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,

    pub description: Option<String>,

    /// Defaults to `Pending`
    pub status: Option<TaskStatus>,

    /// Required
    pub assigned_user_id: Option<Uuid>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(req: CreateTaskRequest) -> Self {
        NewTask {
            title: req.title,
            description: req.description,
            status: req.status,
            assigned_user_id: req.assigned_user_id,
        }
    }
}

/// Update task request; absent fields are left unchanged
///
/// The title is checked by the service after a User's non-status fields
/// have been dropped.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,

    /// `null` clears the description, absence keeps it
    #[serde(deserialize_with = "present")]
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,

    pub assigned_user_id: Option<Uuid>,
}

/// Marks a present field (including an explicit `null`) as `Some`
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl From<UpdateTaskRequest> for UpdateTask {
    fn from(req: UpdateTaskRequest) -> Self {
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            assigned_user_id: req.assigned_user_id,
        }
    }
}

/// List the tasks visible to the caller
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<TaskDto>>> {
    let tasks = state.tasks.list(&actor).await?;
    Ok(Json(tasks))
}

/// Read one task
///
/// # Errors
///
/// - `404 Not Found`: No such task, or it belongs to someone else
pub async fn get_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<TaskDto>> {
    let Path(id) = id?;
    let task = state.tasks.get(&actor, id).await?;
    Ok(Json(task))
}

/// Create a task
///
/// # Errors
///
/// - `400 Bad Request`: Blank title, missing or unknown assignee
/// - `403 Forbidden`: Not an Admin
pub async fn create_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskDto>)> {
    let Json(req) = payload?;
    let task = state.tasks.create(&actor, req.into()).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Update a task
///
/// A User's changes other than `status` are ignored.
///
/// # Errors
///
/// - `400 Bad Request`: Blank title or unknown assignee (Admin)
/// - `404 Not Found`: No such task, or a User's task belongs to someone else
pub async fn update_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<TaskDto>> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let task = state.tasks.update(&actor, id, req.into()).await?;
    Ok(Json(task))
}

/// Delete a task
///
/// # Errors
///
/// - `403 Forbidden`: Not an Admin
/// - `404 Not Found`: No such task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.tasks.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
