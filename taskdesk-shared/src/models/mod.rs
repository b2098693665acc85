/// Domain models for TaskDesk
///
/// # Models
///
/// - `user`: User accounts and roles
/// - `task`: Tasks and their status
///
/// Each model comes in three shapes: the stored record (`User`, `Task`),
/// write inputs (`CreateX`, `UpdateX`) and the outward DTO (`UserDto`,
/// `TaskDto`) which never carries internal-only fields.

pub mod task;
pub mod user;

pub use task::{CreateTask, Task, TaskDto, TaskStatus, UpdateTask};
pub use user::{CreateUser, Role, UpdateUser, User, UserDto};
