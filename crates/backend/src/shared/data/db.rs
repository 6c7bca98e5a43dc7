use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

/// Open (or create) the SQLite database at `db_path` and bootstrap the
/// schema. The connection is returned to the caller and passed explicitly
/// into every repository; there is no process-global handle.
pub async fn initialize_database(db_path: &str) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_path).is_absolute() {
        std::path::PathBuf::from(db_path)
    } else {
        std::env::current_dir()?.join(db_path)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    create_schema(&conn).await?;

    Ok(conn)
}

/// Ensure required tables exist (minimal schema bootstrap)
pub async fn create_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    if !table_exists(conn, "sales_persons").await? {
        tracing::info!("Creating sales_persons table");
        let create_sales_persons_sql = r#"
            CREATE TABLE sales_persons (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                hashed_password TEXT NOT NULL
            );
        "#;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_sales_persons_sql.to_string(),
        ))
        .await?;
    }

    if !table_exists(conn, "leads").await? {
        tracing::info!("Creating leads table");
        let create_leads_sql = r#"
            CREATE TABLE leads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                contact_information TEXT NOT NULL UNIQUE,
                source TEXT NOT NULL,
                interest TEXT NOT NULL,
                status TEXT NOT NULL,
                assigned_salesperson_name TEXT NOT NULL DEFAULT '',
                salesperson_id INTEGER REFERENCES sales_persons(id)
            );
        "#;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_leads_sql.to_string(),
        ))
        .await?;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "CREATE INDEX idx_leads_name ON leads (name);".to_string(),
        ))
        .await?;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "CREATE INDEX idx_leads_status ON leads (status);".to_string(),
        ))
        .await?;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "CREATE INDEX idx_leads_salesperson_name ON leads (assigned_salesperson_name);"
                .to_string(),
        ))
        .await?;
    }

    if !table_exists(conn, "sys_users").await? {
        tracing::info!("Creating sys_users table");
        let create_sys_users_sql = r#"
            CREATE TABLE sys_users (
                id TEXT PRIMARY KEY NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                full_name TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT,
                updated_at TEXT
            );
        "#;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_sys_users_sql.to_string(),
        ))
        .await?;
    }

    Ok(())
}

async fn table_exists(conn: &DatabaseConnection, name: &str) -> anyhow::Result<bool> {
    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type='table' AND name=?;",
            [name.into()],
        ))
        .await?;
    Ok(!rows.is_empty())
}

/// In-memory database with the full schema for repository tests. A single
/// pooled connection keeps every session on the same memory store.
#[cfg(test)]
pub async fn connect_test_db() -> DatabaseConnection {
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1);
    let conn = Database::connect(options)
        .await
        .expect("in-memory sqlite connect");
    create_schema(&conn).await.expect("schema bootstrap");
    conn
}
