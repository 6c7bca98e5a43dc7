use anyhow::Result;
use sea_orm::DatabaseConnection;

use crate::system::users::{repository, service};

/// Ensure an admin identity exists (create if table is empty)
pub async fn ensure_admin_user_exists(db: &DatabaseConnection) -> Result<()> {
    let count = repository::count_users(db).await?;

    if count == 0 {
        tracing::info!("No users found. Creating default admin user...");

        let admin_id = service::create(
            db,
            "admin@example.com",
            "password",
            Some("Administrator".to_string()),
        )
        .await?;

        tracing::warn!("═══════════════════════════════════════════════");
        tracing::warn!("  Default admin user created!");
        tracing::warn!("  Email: admin@example.com");
        tracing::warn!("  Password: password");
        tracing::warn!("  User ID: {}", admin_id);
        tracing::warn!("  ⚠️  PLEASE CHANGE THE PASSWORD IMMEDIATELY!");
        tracing::warn!("═══════════════════════════════════════════════");
    }

    Ok(())
}
