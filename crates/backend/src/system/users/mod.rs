pub mod repository;
pub mod service;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

/// An identity known to the system, as resolved from a token subject.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
}

/// Pluggable identity lookup behind the authorization gate.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Identity>>;
}

/// Production store backed by the sys_users table, wrapping the
/// explicitly passed-in database connection.
#[derive(Clone)]
pub struct DbIdentityStore {
    db: DatabaseConnection,
}

impl DbIdentityStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityStore for DbIdentityStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Identity>> {
        repository::find_by_email(&self.db, email).await
    }
}

/// Single-credential in-memory store for tests.
#[cfg(test)]
pub struct FixedIdentityStore {
    identity: Identity,
}

#[cfg(test)]
impl FixedIdentityStore {
    pub fn new(email: &str, password: &str) -> Self {
        let password_hash =
            crate::system::auth::password::hash_password(password).expect("hash test password");
        Self {
            identity: Identity {
                id: uuid::Uuid::new_v4().to_string(),
                email: email.to_string(),
                password_hash,
                is_active: true,
            },
        }
    }
}

#[cfg(test)]
#[async_trait]
impl IdentityStore for FixedIdentityStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Identity>> {
        if email == self.identity.email {
            Ok(Some(self.identity.clone()))
        } else {
            Ok(None)
        }
    }
}
