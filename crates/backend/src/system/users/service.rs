use anyhow::Result;
use chrono::Utc;
use sea_orm::ConnectionTrait;

use super::repository;
use crate::system::auth::password;

/// Create a new user with a hashed credential; returns the new id.
pub async fn create<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    plain_password: &str,
    full_name: Option<String>,
) -> Result<String> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(anyhow::anyhow!("Invalid email format"));
    }

    if repository::find_by_email(conn, email).await?.is_some() {
        return Err(anyhow::anyhow!("Email already exists"));
    }

    let password_hash = password::hash_password(plain_password)?;

    let user_id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let user = repository::Model {
        id: user_id.clone(),
        email: email.to_string(),
        password_hash,
        full_name,
        is_active: true,
        created_at: Some(now.clone()),
        updated_at: Some(now),
    };

    repository::insert(conn, user).await?;

    Ok(user_id)
}
