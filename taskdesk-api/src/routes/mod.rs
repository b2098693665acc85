/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login and current-user endpoints
/// - `users`: User management
/// - `tasks`: Task CRUD

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
