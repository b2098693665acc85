/// User administration and self-service profile edits

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, Validator};
use crate::auth::actor::Actor;
use crate::auth::password;
use crate::auth::policy::{self, Denial};
use crate::models::{CreateUser, Role, UpdateUser, UserDto};
use crate::store::UserStore;

/// Input for creating a user (plaintext password, hashed here)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,

    /// Defaults to [`Role::User`]
    pub role: Option<Role>,
}

/// Requested changes to a user
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

fn denied(denial: Denial, action: &str) -> ServiceError {
    match denial {
        Denial::Forbidden => ServiceError::Forbidden(format!("Not allowed to {}", action)),
        Denial::NotFound => ServiceError::NotFound("User not found".to_string()),
    }
}

/// Hashes on the blocking pool; Argon2id is deliberately slow
pub(crate) async fn hash_password(plaintext: String) -> Result<String, ServiceError> {
    tokio::task::spawn_blocking(move || password::hash_password(&plaintext))
        .await
        .map_err(|e| ServiceError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(ServiceError::from)
}

/// User operations guarded by the authorization policy
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Lists all users (Admin only)
    pub async fn list(&self, actor: &Actor) -> Result<Vec<UserDto>, ServiceError> {
        policy::can_manage_users(actor).map_err(|d| denied(d, "list users"))?;

        let users = self.users.list().await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }

    /// Reads one user (Admin, or the user themself)
    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<UserDto, ServiceError> {
        policy::can_read_user(actor, id).map_err(|d| denied(d, "view this user"))?;

        self.users
            .find_by_id(id)
            .await?
            .map(UserDto::from)
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    /// Creates a user (Admin only)
    ///
    /// # Errors
    ///
    /// - `Validation` for blank or malformed fields and weak passwords
    /// - `Conflict` if the username or email is taken
    pub async fn create(&self, actor: &Actor, input: NewUser) -> Result<UserDto, ServiceError> {
        policy::can_manage_users(actor).map_err(|d| denied(d, "create users"))?;

        let username = input.username.trim().to_string();
        let email = input.email.trim().to_lowercase();

        let mut v = Validator::new();
        v.text("username", &username, 100);
        v.email("email", &email);
        if let Err(message) = password::validate_password_strength(&input.password) {
            v.push("password", message);
        }
        v.finish()?;

        let password_hash = hash_password(input.password).await?;
        let user = self
            .users
            .create(CreateUser {
                username,
                email,
                password_hash,
                role: input.role.unwrap_or_default(),
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, created_by = %actor.user_id, "User created");
        Ok(UserDto::from(user))
    }

    /// Updates a user
    ///
    /// Anyone may edit their own username/email; Admin may edit anyone and
    /// change roles.
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<UserDto, ServiceError> {
        policy::can_update_user(actor, id, changes.role.is_some())
            .map_err(|d| denied(d, "update this user"))?;

        let username = changes.username.map(|u| u.trim().to_string());
        let email = changes.email.map(|e| e.trim().to_lowercase());

        let mut v = Validator::new();
        if let Some(username) = &username {
            v.text("username", username, 100);
        }
        if let Some(email) = &email {
            v.email("email", email);
        }
        v.finish()?;

        let user = self
            .users
            .update(
                id,
                UpdateUser {
                    username,
                    email,
                    role: changes.role,
                },
            )
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        info!(user_id = %user.id, updated_by = %actor.user_id, "User updated");
        Ok(UserDto::from(user))
    }

    /// Deletes a user (Admin only)
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user doesn't exist
    /// - `Conflict` while tasks are still assigned to the user
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
        policy::can_manage_users(actor).map_err(|d| denied(d, "delete users"))?;

        if !self.users.delete(id).await? {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        info!(user_id = %id, deleted_by = %actor.user_id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn admin() -> Actor {
        Actor::new(Uuid::new_v4(), Role::Admin)
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "User123!".to_string(),
            role: None,
        }
    }

    fn service() -> (UserService, Arc<dyn UserStore>) {
        let users: Arc<dyn UserStore> = Arc::new(MemoryStore::new());
        (UserService::new(users.clone()), users)
    }

    #[tokio::test]
    async fn test_create_hashes_password_and_defaults_role() {
        let (service, users) = service();

        let dto = service.create(&admin(), new_user("alice")).await.unwrap();
        assert_eq!(dto.role, Role::User);

        let stored = users.find_by_id(dto.id).await.unwrap().unwrap();
        assert!(stored.password_hash.starts_with("$argon2id$"));
        assert!(password::verify_password("User123!", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email_conflicts_without_change() {
        let (service, users) = service();
        let admin = admin();
        service.create(&admin, new_user("alice")).await.unwrap();

        let mut dup_name = new_user("alice");
        dup_name.email = "alice2@example.com".to_string();
        assert!(matches!(
            service.create(&admin, dup_name).await,
            Err(ServiceError::Conflict(_))
        ));

        let mut dup_email = new_user("bob");
        dup_email.email = "ALICE@example.com".to_string();
        assert!(matches!(
            service.create(&admin, dup_email).await,
            Err(ServiceError::Conflict(_))
        ));

        assert_eq!(users.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let (service, _) = service();

        let input = NewUser {
            username: " ".to_string(),
            email: "nope".to_string(),
            password: "weak".to_string(),
            role: Some(Role::Admin),
        };
        match service.create(&admin(), input).await {
            Err(ServiceError::Validation(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["username", "email", "password"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_user_management_requires_admin() {
        let (service, _) = service();
        let user = Actor::new(Uuid::new_v4(), Role::User);

        assert!(matches!(service.list(&user).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(
            service.create(&user, new_user("eve")).await,
            Err(ServiceError::Forbidden(_))
        ));
        let blank = NewUser {
            username: String::new(),
            email: String::new(),
            password: String::new(),
            role: None,
        };
        assert!(matches!(
            service.create(&user, blank).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.delete(&user, Uuid::new_v4()).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_self_service_update() {
        let (service, _) = service();
        let created = service.create(&admin(), new_user("alice")).await.unwrap();
        let alice = Actor::new(created.id, Role::User);

        let updated = service
            .update(
                &alice,
                alice.user_id,
                UserChanges {
                    username: Some("alice.w".to_string()),
                    email: Some("Alice.W@Example.com".to_string()),
                    role: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.username, "alice.w");
        assert_eq!(updated.email, "alice.w@example.com");

        // Users cannot promote themselves
        let promote = UserChanges {
            role: Some(Role::Admin),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&alice, alice.user_id, promote.clone()).await,
            Err(ServiceError::Forbidden(_))
        ));

        // Admin can
        let promoted = service.update(&admin(), alice.user_id, promote).await.unwrap();
        assert_eq!(promoted.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_read_and_update_other_users() {
        let (service, _) = service();
        let admin = admin();
        let alice = service.create(&admin, new_user("alice")).await.unwrap();
        let bob = service.create(&admin, new_user("bob")).await.unwrap();
        let alice_actor = Actor::new(alice.id, Role::User);

        assert_eq!(service.get(&alice_actor, alice.id).await.unwrap().username, "alice");
        assert!(matches!(
            service.get(&alice_actor, bob.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service
                .update(&alice_actor, bob.id, UserChanges::default())
                .await,
            Err(ServiceError::Forbidden(_))
        ));

        assert!(matches!(
            service.get(&admin, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service
                .update(&admin, Uuid::new_v4(), UserChanges::default())
                .await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let (service, _) = service();
        let admin = admin();
        let alice = service.create(&admin, new_user("alice")).await.unwrap();

        service.delete(&admin, alice.id).await.unwrap();
        assert!(matches!(
            service.delete(&admin, alice.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
