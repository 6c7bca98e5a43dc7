use anyhow::{Context, Result};
use chrono::Utc;
use contracts::system::auth::TokenClaims;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;

use crate::shared::config::AuthSettings;

/// Process-wide token configuration, carried in application state and passed
/// into every issue/validate call.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub token_ttl_minutes: i64,
}

impl AuthConfig {
    pub fn from_settings(settings: &AuthSettings) -> Self {
        let secret = match &settings.secret {
            Some(secret) => secret.clone(),
            None => {
                tracing::warn!(
                    "No auth secret configured; generated a random one (tokens will not survive restarts)"
                );
                generate_jwt_secret()
            }
        };
        Self {
            secret,
            token_ttl_minutes: settings.token_ttl_minutes,
        }
    }
}

/// Issue a signed HS256 access token for the given subject email.
pub fn issue_access_token(cfg: &AuthConfig, email: &str) -> Result<String> {
    let now = Utc::now();
    let exp = (now + chrono::Duration::minutes(cfg.token_ttl_minutes)).timestamp() as usize;
    let iat = now.timestamp() as usize;

    let claims = TokenClaims {
        sub: email.to_string(),
        exp,
        iat,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.secret.as_bytes()),
    )
    .context("Failed to encode JWT token")?;

    Ok(token)
}

/// Decode and check a token. Returns `None` on malformed input, a bad
/// signature, or an expired token; garbage input can never panic the caller.
/// Leeway is zero so expiry is exact.
pub fn validate_token(cfg: &AuthConfig, token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(cfg.secret.as_bytes()),
        &validation,
    )
    .ok()
    .map(|data| data.claims)
}

/// Generate a cryptographically secure JWT secret (256 bits)
pub fn generate_jwt_secret() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen::<u8>()).collect();
    general_purpose::STANDARD.encode(&random_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            secret: "test-secret".to_string(),
            token_ttl_minutes: 30,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let cfg = test_config();
        let token = issue_access_token(&cfg, "admin@example.com").unwrap();
        let claims = validate_token(&cfg, &token).unwrap();
        assert_eq!(claims.sub, "admin@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let cfg = AuthConfig {
            secret: "test-secret".to_string(),
            token_ttl_minutes: -1,
        };
        let token = issue_access_token(&cfg, "admin@example.com").unwrap();
        assert!(validate_token(&cfg, &token).is_none());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let cfg = test_config();
        let token = issue_access_token(&cfg, "admin@example.com").unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert!(validate_token(&cfg, &tampered).is_none());

        let other = AuthConfig {
            secret: "other-secret".to_string(),
            token_ttl_minutes: 30,
        };
        assert!(validate_token(&other, &token).is_none());
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        let cfg = test_config();
        assert!(validate_token(&cfg, "").is_none());
        assert!(validate_token(&cfg, "not-a-jwt").is_none());
        assert!(validate_token(&cfg, "a.b.c").is_none());
    }
}
