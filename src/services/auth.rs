//! Authentication service implementation
//!
//! Validates bearer tokens issued by the external identity provider and
//! resolves their claims into an [`AuthContext`]. This service only reads
//! claims; it never manages credentials.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::utils::errors::{AppError, Result};

/// Claims carried by the identity provider's tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user's directory identifier
    pub sub: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    pub exp: i64,
}

/// Resolved identity of the caller of an operation
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub is_admin: bool,
}

impl AuthContext {
    /// Organizer-or-admin rule used by event mutation operations
    pub fn can_manage_event(&self, organizer_id: Uuid) -> bool {
        self.is_admin || self.user_id == organizer_id
    }

    /// Self-or-admin rule used by the user directory operations
    pub fn can_access_user(&self, user_id: Uuid) -> bool {
        self.is_admin || self.user_id == user_id
    }
}

/// Bearer token validation service
#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
    validation: Validation,
    admin_group: String,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            admin_group: config.admin_group.clone(),
        }
    }

    /// Resolve an `Authorization` header value into the caller's identity
    pub fn authenticate(&self, header_value: &str) -> Result<AuthContext> {
        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        self.verify_token(token)
    }

    /// Validate a raw token and map its claims to an [`AuthContext`]
    pub fn verify_token(&self, token: &str) -> Result<AuthContext> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {e}")))?;

        let claims = data.claims;
        let is_admin = claims.groups.iter().any(|g| g == &self.admin_group);
        debug!(user_id = %claims.sub, is_admin = is_admin, "Token validated");

        Ok(AuthContext {
            user_id: claims.sub,
            email: claims.email,
            is_admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn service(secret: &str) -> AuthService {
        AuthService::new(&AuthConfig {
            jwt_secret: secret.to_string(),
            admin_group: "Admin".to_string(),
        })
    }

    fn token(secret: &str, claims: &TokenClaims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(groups: Vec<String>) -> TokenClaims {
        TokenClaims {
            sub: Uuid::new_v4(),
            email: Some("hiker@example.com".to_string()),
            groups,
            exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
        }
    }

    #[test]
    fn test_valid_token_resolves_context() {
        let service = service("secret");
        let claims = claims(vec![]);
        let header = format!("Bearer {}", token("secret", &claims));

        let context = service.authenticate(&header).unwrap();
        assert_eq!(context.user_id, claims.sub);
        assert_eq!(context.email.as_deref(), Some("hiker@example.com"));
        assert!(!context.is_admin);
    }

    #[test]
    fn test_admin_group_grants_admin() {
        let service = service("secret");
        let claims = claims(vec!["Hikers".to_string(), "Admin".to_string()]);
        let context = service.verify_token(&token("secret", &claims)).unwrap();
        assert!(context.is_admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = service("secret");
        let claims = claims(vec![]);
        assert_matches!(
            service.verify_token(&token("other-secret", &claims)),
            Err(AppError::Unauthorized(_))
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = service("secret");
        let mut claims = claims(vec![]);
        claims.exp = (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp();
        assert_matches!(
            service.verify_token(&token("secret", &claims)),
            Err(AppError::Unauthorized(_))
        );
    }

    #[test]
    fn test_missing_bearer_prefix_rejected() {
        let service = service("secret");
        assert_matches!(
            service.authenticate("Basic abc"),
            Err(AppError::Unauthorized(_))
        );
    }

    #[test]
    fn test_manage_rules() {
        let organizer = Uuid::new_v4();
        let other = Uuid::new_v4();

        let caller = AuthContext {
            user_id: organizer,
            email: None,
            is_admin: false,
        };
        assert!(caller.can_manage_event(organizer));
        assert!(!caller.can_manage_event(other));
        assert!(caller.can_access_user(organizer));
        assert!(!caller.can_access_user(other));

        let admin = AuthContext {
            user_id: other,
            email: None,
            is_admin: true,
        };
        assert!(admin.can_manage_event(organizer));
        assert!(admin.can_access_user(organizer));
    }
}
