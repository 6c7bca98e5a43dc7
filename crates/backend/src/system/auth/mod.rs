pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

use thiserror::Error;

use crate::system::users::{Identity, IdentityStore};
use jwt::AuthConfig;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Token missing, malformed, expired, or carrying a bad signature
    #[error("Could not validate credentials")]
    Unauthenticated,
    /// Token is valid but its subject has no matching identity
    #[error("User not found")]
    UserNotFound,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Map a bearer token to a known identity. This is the single authorization
/// gate in front of mutating operations.
pub async fn resolve_identity(
    store: &dyn IdentityStore,
    cfg: &AuthConfig,
    token: &str,
) -> Result<Identity, AuthError> {
    let claims = jwt::validate_token(cfg, token).ok_or(AuthError::Unauthenticated)?;

    let identity = store
        .find_by_email(&claims.sub)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if !identity.is_active {
        return Err(AuthError::Unauthenticated);
    }

    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::users::FixedIdentityStore;

    fn store() -> FixedIdentityStore {
        FixedIdentityStore::new("admin@example.com", "password")
    }

    fn cfg() -> AuthConfig {
        AuthConfig {
            secret: "test-secret".to_string(),
            token_ttl_minutes: 30,
        }
    }

    #[tokio::test]
    async fn test_valid_token_resolves_identity() {
        let cfg = cfg();
        let token = jwt::issue_access_token(&cfg, "admin@example.com").unwrap();
        let identity = resolve_identity(&store(), &cfg, &token).await.unwrap();
        assert_eq!(identity.email, "admin@example.com");
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthenticated() {
        let expired_cfg = AuthConfig {
            secret: "test-secret".to_string(),
            token_ttl_minutes: -1,
        };
        let token = jwt::issue_access_token(&expired_cfg, "admin@example.com").unwrap();
        let err = resolve_identity(&store(), &cfg(), &token).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_unknown_subject_is_user_not_found() {
        let cfg = cfg();
        let token = jwt::issue_access_token(&cfg, "ghost@example.com").unwrap();
        let err = resolve_identity(&store(), &cfg, &token).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }
}
