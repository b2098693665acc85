/// Demo data for a fresh store
///
/// Creates one Admin, one User and three tasks (one per status) when the
/// store has no users yet. Existing data is never touched.
///
/// | Username | Password | Role |
/// |----------|----------|------|
/// | `admin` | `Admin123!` | Admin |
/// | `user` | `User123!` | User |

use anyhow::Context;
use taskdesk_shared::{
    auth::password,
    models::{CreateTask, CreateUser, Role, TaskStatus},
    store::{TaskStore, UserStore},
};
use tracing::info;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "Admin123!";
pub const USER_USERNAME: &str = "user";
pub const USER_PASSWORD: &str = "User123!";

async fn hash(plaintext: &'static str) -> anyhow::Result<String> {
    let digest = tokio::task::spawn_blocking(move || password::hash_password(plaintext))
        .await
        .context("hashing task panicked")??;
    Ok(digest)
}

/// Seeds demo accounts and tasks into an empty store
///
/// Returns true if anything was created.
pub async fn seed_demo_data<S>(store: &S) -> anyhow::Result<bool>
where
    S: UserStore + TaskStore,
{
    if UserStore::count(store).await? > 0 {
        info!("Users present, skipping demo data");
        return Ok(false);
    }

    let admin = UserStore::create(
        store,
        CreateUser {
            username: ADMIN_USERNAME.to_string(),
            email: "admin@taskdesk.local".to_string(),
            password_hash: hash(ADMIN_PASSWORD).await?,
            role: Role::Admin,
        },
    )
    .await?;

    let user = UserStore::create(
        store,
        CreateUser {
            username: USER_USERNAME.to_string(),
            email: "user@taskdesk.local".to_string(),
            password_hash: hash(USER_PASSWORD).await?,
            role: Role::User,
        },
    )
    .await?;

    let tasks = [
        (
            "Review onboarding checklist",
            "Walk through the new-hire checklist and flag gaps",
            TaskStatus::Pending,
            user.id,
        ),
        (
            "Update project documentation",
            "Bring the README in line with the current API",
            TaskStatus::InProgress,
            user.id,
        ),
        (
            "Configure team accounts",
            "Create accounts for the initial team members",
            TaskStatus::Completed,
            admin.id,
        ),
    ];

    for (title, description, status, assigned_user_id) in tasks {
        TaskStore::create(
            store,
            CreateTask {
                title: title.to_string(),
                description: Some(description.to_string()),
                status,
                assigned_user_id,
            },
        )
        .await?;
    }

    info!(admin_id = %admin.id, user_id = %user.id, "Seeded demo users and tasks");
    Ok(true)
}
