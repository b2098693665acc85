/// Token issuer
///
/// Verifies username + password against the credential store and issues a
/// signed, time-bound token. Every failure on the login path is reported the
/// same way, so callers cannot tell an unknown username from a wrong
/// password.

use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{ServiceError, Validator};
use crate::auth::actor::Actor;
use crate::auth::jwt::{self, Claims, JwtError};
use crate::auth::password;
use crate::models::UserDto;
use crate::store::UserStore;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserDto,
}

/// Issues and verifies identity tokens
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: Arc<str>,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: &str, token_ttl: Duration) -> Self {
        Self {
            users,
            jwt_secret: Arc::from(jwt_secret),
            token_ttl,
        }
    }

    /// Verifies credentials and issues a token
    ///
    /// # Errors
    ///
    /// - `Validation` if username or password is missing
    /// - `Authentication` for an unknown user or a wrong password
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, ServiceError> {
        let mut v = Validator::new();
        if username.trim().is_empty() {
            v.push("username", "username is required");
        }
        if password.is_empty() {
            v.push("password", "password is required");
        }
        v.finish()?;

        let user = self.users.find_by_username(username.trim()).await?;

        // Unknown users still pay for one verification against a dummy digest
        let digest = user.as_ref().map(|u| u.password_hash.clone());
        let candidate = password.to_string();
        let matches = tokio::task::spawn_blocking(move || match digest {
            Some(digest) => password::verify_password(&candidate, &digest),
            None => password::verify_password(&candidate, password::dummy_hash()?).map(|_| false),
        })
        .await
        .map_err(|e| ServiceError::Internal(format!("Verification task failed: {}", e)))??;

        let user = match user {
            Some(user) if matches => user,
            _ => {
                warn!(username = %username.trim(), "Failed login attempt");
                return Err(ServiceError::Authentication(INVALID_CREDENTIALS.to_string()));
            }
        };

        let claims = Claims::with_expiration(
            user.id,
            &user.username,
            &user.email,
            user.role,
            self.token_ttl,
        );
        let token = jwt::create_token(&claims, &self.jwt_secret)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(LoginOutcome {
            token,
            user: UserDto::from(user),
        })
    }

    /// Validates a bearer token and returns the acting identity
    ///
    /// # Errors
    ///
    /// `Authentication` for expired, tampered or foreign tokens
    pub fn verify(&self, token: &str) -> Result<Actor, ServiceError> {
        let claims = jwt::validate_token(token, &self.jwt_secret).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            match e {
                JwtError::Expired => ServiceError::Authentication("Token expired".to_string()),
                _ => ServiceError::Authentication("Invalid token".to_string()),
            }
        })?;

        Ok(Actor::from(&claims))
    }
}
