/// Authenticated identity making a request
///
/// The API boundary builds an [`Actor`] from a validated token and passes it
/// down explicitly; nothing below the boundary reads request state.
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::actor::{parse_bearer, Actor};
/// use taskdesk_shared::models::Role;
/// use uuid::Uuid;
///
/// let actor = Actor::new(Uuid::new_v4(), Role::User);
/// assert!(!actor.is_admin());
///
/// assert_eq!(parse_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
/// assert_eq!(parse_bearer("Basic dXNlcjpwYXNz"), None);
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;
use crate::models::Role;

/// Actor identity: who is asking, and with which role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Checks if the actor holds the Admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Checks if the actor is the given user
    pub fn is(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

impl From<&Claims> for Actor {
    fn from(claims: &Claims) -> Self {
        Self::new(claims.sub, claims.role)
    }
}

/// Extracts the token from an `Authorization` header value
///
/// Accepts the scheme case-insensitively and rejects empty tokens.
pub fn parse_bearer(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_from_claims() {
        let claims = Claims::new(Uuid::new_v4(), "admin", "admin@example.com", Role::Admin);
        let actor = Actor::from(&claims);

        assert_eq!(actor.user_id, claims.sub);
        assert!(actor.is_admin());
        assert!(actor.is(claims.sub));
        assert!(!actor.is(Uuid::new_v4()));
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer token"), Some("token"));
        assert_eq!(parse_bearer("bearer token"), Some("token"));
        assert_eq!(parse_bearer("  Bearer   token  "), Some("token"));
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("Bearer"), None);
        assert_eq!(parse_bearer("Token token"), None);
        assert_eq!(parse_bearer(""), None);
    }
}
