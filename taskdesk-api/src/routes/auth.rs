/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/login` - Exchange credentials for a token
/// - `GET /api/auth/me` - Profile of the token's subject

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use taskdesk_shared::{auth::actor::Actor, models::UserDto, service::ServiceError};
use validator::Validate;

/// Login request
///
/// Missing fields deserialize as empty strings so they surface as
/// validation errors instead of body rejections.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub token: String,

    /// The authenticated user
    pub user: UserDto,
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "username": "admin",
///   "password": "Admin123!"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user": { "id": "uuid", "username": "admin", "email": "...", "role": "Admin", "createdAt": "..." }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing username or password
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let outcome = state.auth.login(&req.username, &req.password).await?;

    Ok(Json(LoginResponse {
        token: outcome.token,
        user: outcome.user,
    }))
}

/// Current user endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: Token is invalid, or its subject no longer exists
pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<UserDto>> {
    match state.users.get(&actor, actor.user_id).await {
        Ok(user) => Ok(Json(user)),
        Err(ServiceError::NotFound(_)) => Err(ApiError::Unauthorized(
            "Token subject no longer exists".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}
