/// Application services
///
/// Services combine the [`crate::auth::policy`] decisions with the
/// [`crate::store`] traits. Each operation takes the acting [`Actor`]
/// explicitly and returns a [`ServiceError`] that the HTTP layer maps onto a
/// status code.
///
/// - [`AuthService`]: login and token verification
/// - [`UserService`]: user administration and self-service profile edits
/// - [`TaskService`]: task CRUD filtered by ownership
///
/// [`Actor`]: crate::auth::actor::Actor

use serde::{Deserialize, Serialize};

use crate::auth::password::PasswordError;
use crate::store::StoreError;

pub mod auth;
pub mod tasks;
pub mod users;

pub use auth::{AuthService, LoginOutcome};
pub use tasks::{NewTask, TaskService};
pub use users::{NewUser, UserChanges, UserService};

/// A single invalid input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation (wire name)
    pub field: String,

    /// Error message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing or malformed input
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<FieldError>),

    /// Write collides with existing data
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing resource, or one the actor may not know about
    #[error("Not found: {0}")]
    NotFound(String),

    /// Role or ownership violation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad credentials or invalid token
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Storage or hashing failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Single-field validation error
    pub fn invalid(field: &str, message: &str) -> Self {
        ServiceError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { field } => {
                ServiceError::Conflict(format!("A user with this {} already exists", field))
            }
            StoreError::InvalidAssignee(_) => {
                ServiceError::invalid("assignedUserId", "Assigned user does not exist")
            }
            StoreError::UserHasTasks(_) => ServiceError::Conflict(
                "User still has assigned tasks; reassign or delete them first".to_string(),
            ),
            StoreError::Database(e) => ServiceError::Internal(format!("Database error: {}", e)),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Collects field errors, failing if any were recorded
#[derive(Debug, Default)]
pub(crate) struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Requires a non-blank value of at most `max` characters
    pub(crate) fn text(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.errors
                .push(FieldError::new(field, format!("{} is required", field)));
        } else if value.chars().count() > max {
            self.errors.push(FieldError::new(
                field,
                format!("{} must be at most {} characters", field, max),
            ));
        }
    }

    /// Requires a plausible `local@domain` address
    pub(crate) fn email(&mut self, field: &str, value: &str) {
        self.text(field, value, 255);

        let valid = value
            .trim()
            .split_once('@')
            .map(|(local, domain)| {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            })
            .unwrap_or(false);
        if !value.trim().is_empty() && !valid {
            self.errors
                .push(FieldError::new(field, "Invalid email format"));
        }
    }

    pub(crate) fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub(crate) fn finish(self) -> Result<(), ServiceError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(self.errors))
        }
    }
}
