/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength validation
/// - [`jwt`]: Token issuing and validation
/// - [`actor`]: The authenticated identity passed down from the API boundary
/// - [`policy`]: Pure access-control decisions for users and tasks
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::auth::jwt::{create_token, validate_token, Claims};
/// use taskdesk_shared::auth::password::{hash_password, verify_password};
/// use taskdesk_shared::models::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Admin123!")?;
/// assert!(verify_password("Admin123!", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), "admin", "admin@example.com", Role::Admin);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// let _ = validate_token(&token, "secret-key-at-least-32-bytes-long!!")?;
/// # Ok(())
/// # }
/// ```

pub mod actor;
pub mod jwt;
pub mod password;
pub mod policy;
