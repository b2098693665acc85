/// Authorization policy for users and tasks
///
/// Pure decisions over `(actor, action, resource owner)`. No I/O: callers load
/// the resource, ask the policy, then act on the answer.
///
/// # Rules
///
/// | Action | Admin | User |
/// |--------|-------|------|
/// | List tasks | all tasks | tasks assigned to self |
/// | Read task | allowed | own task, otherwise *not found* |
/// | Create task | allowed | forbidden |
/// | Update task | all fields | own task, status only, otherwise *not found* |
/// | Delete task | allowed | forbidden |
/// | List/create/delete users | allowed | forbidden |
/// | Read user | allowed | self only |
/// | Update user | anyone, role included | self, never role |
///
/// A denied task read or update is reported as [`Denial::NotFound`] so that
/// a user cannot probe for tasks belonging to someone else.
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::actor::Actor;
/// use taskdesk_shared::auth::policy::{self, Denial, TaskScope};
/// use taskdesk_shared::models::Role;
/// use uuid::Uuid;
///
/// let user = Actor::new(Uuid::new_v4(), Role::User);
/// let someone_else = Uuid::new_v4();
///
/// assert_eq!(policy::task_scope(&user), TaskScope::AssignedTo(user.user_id));
/// assert_eq!(policy::can_read_task(&user, someone_else), Err(Denial::NotFound));
/// assert_eq!(policy::can_create_task(&user), Err(Denial::Forbidden));
/// ```

use uuid::Uuid;

use super::actor::Actor;
use crate::models::{Role, UpdateTask};

/// Why the policy refused an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    /// The caller knows the resource exists but may not act on it
    #[error("forbidden")]
    Forbidden,

    /// The resource must look absent to the caller
    #[error("not found")]
    NotFound,
}

/// Which tasks an actor may see in a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    All,
    AssignedTo(Uuid),
}

/// Fields an actor may change on a given task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskUpdateRights {
    /// Title, description, status and assignee
    Full,

    /// Status only; every other requested change is dropped
    StatusOnly,
}

impl TaskUpdateRights {
    /// Strips the changes these rights do not cover
    pub fn filter(self, changes: UpdateTask) -> UpdateTask {
        match self {
            TaskUpdateRights::Full => changes,
            TaskUpdateRights::StatusOnly => UpdateTask {
                status: changes.status,
                ..Default::default()
            },
        }
    }
}

/// Rule 1: listing tasks
pub fn task_scope(actor: &Actor) -> TaskScope {
    match actor.role {
        Role::Admin => TaskScope::All,
        Role::User => TaskScope::AssignedTo(actor.user_id),
    }
}

/// Rule 2: reading a single task
pub fn can_read_task(actor: &Actor, owner_id: Uuid) -> Result<(), Denial> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::User if actor.is(owner_id) => Ok(()),
        Role::User => Err(Denial::NotFound),
    }
}

/// Rule 3: creating a task
pub fn can_create_task(actor: &Actor) -> Result<(), Denial> {
    require_admin(actor)
}

/// Rule 4: updating a task
pub fn task_update_rights(actor: &Actor, owner_id: Uuid) -> Result<TaskUpdateRights, Denial> {
    match actor.role {
        Role::Admin => Ok(TaskUpdateRights::Full),
        Role::User if actor.is(owner_id) => Ok(TaskUpdateRights::StatusOnly),
        Role::User => Err(Denial::NotFound),
    }
}

/// Rule 5: deleting a task
pub fn can_delete_task(actor: &Actor) -> Result<(), Denial> {
    require_admin(actor)
}

/// Rule 6: listing, creating and deleting users
pub fn can_manage_users(actor: &Actor) -> Result<(), Denial> {
    require_admin(actor)
}

/// Rule 6: reading a single user
pub fn can_read_user(actor: &Actor, target_id: Uuid) -> Result<(), Denial> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::User if actor.is(target_id) => Ok(()),
        Role::User => Err(Denial::Forbidden),
    }
}

/// Rule 7: updating a user
///
/// `changes_role` is true when the request carries a role at all.
pub fn can_update_user(actor: &Actor, target_id: Uuid, changes_role: bool) -> Result<(), Denial> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::User if actor.is(target_id) && !changes_role => Ok(()),
        Role::User => Err(Denial::Forbidden),
    }
}

fn require_admin(actor: &Actor) -> Result<(), Denial> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::User => Err(Denial::Forbidden),
    }
}
