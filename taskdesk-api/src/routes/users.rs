/// User management endpoints
///
/// - `GET /api/users` - List users (Admin)
/// - `POST /api/users` - Create user (Admin)
/// - `GET /api/users/:id` - Read user (Admin or self)
/// - `PUT /api/users/:id` - Update user (Admin, or self without role)
/// - `DELETE /api/users/:id` - Delete user (Admin)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskdesk_shared::{
    auth::actor::Actor,
    models::{Role, UserDto},
    service::{NewUser, UserChanges},
};
use uuid::Uuid;

/// Create user request
///
/// Fields are checked by [`taskdesk_shared::service::UserService::create`]
/// after the Admin check.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,

    pub email: String,

    /// Must pass the password strength check
    pub password: String,

    /// Defaults to `User`
    pub role: Option<Role>,
}

/// Update user request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,

    pub email: Option<String>,

    /// Admin only
    pub role: Option<Role>,
}

/// List all users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<UserDto>>> {
    let users = state.users.list(&actor).await?;
    Ok(Json(users))
}

/// Read one user
///
/// # Errors
///
/// - `403 Forbidden`: A User reading someone else
/// - `404 Not Found`: No such user
pub async fn get_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<UserDto>> {
    let Path(id) = id?;
    let user = state.users.get(&actor, id).await?;
    Ok(Json(user))
}

/// Create a user
///
/// # Errors
///
/// - `400 Bad Request`: Invalid fields, weak password, or duplicate username/email
/// - `403 Forbidden`: Not an Admin
pub async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserDto>)> {
    let Json(req) = payload?;
    let user = state
        .users
        .create(
            &actor,
            NewUser {
                username: req.username,
                email: req.email,
                password: req.password,
                role: req.role,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user
///
/// # Errors
///
/// - `400 Bad Request`: Invalid fields or duplicate username/email
/// - `403 Forbidden`: Editing someone else, or a User changing a role
/// - `404 Not Found`: No such user
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<UserDto>> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let user = state
        .users
        .update(
            &actor,
            id,
            UserChanges {
                username: req.username,
                email: req.email,
                role: req.role,
            },
        )
        .await?;

    Ok(Json(user))
}

/// Delete a user
///
/// # Errors
///
/// - `400 Bad Request`: Tasks are still assigned to the user
/// - `403 Forbidden`: Not an Admin
/// - `404 Not Found`: No such user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.users.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
