use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_health_metrics_table(conn)?;
    create_health_metrics_index(conn)?;
    create_user_profiles_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the health metrics table
fn create_health_metrics_table(conn: &Connection) -> Result<(), String> {
    info!("Creating health_metrics table if not exists");

    // value is kept as entered; parsing happens at read time
    conn.execute(
        "CREATE TABLE IF NOT EXISTS health_metrics (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            metric_type TEXT NOT NULL,
            value TEXT NOT NULL,
            unit TEXT NOT NULL,
            notes TEXT,
            timestamp TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create index on (user_id, timestamp) for per-user newest-first queries
fn create_health_metrics_index(conn: &Connection) -> Result<(), String> {
    info!("Creating index on user_id, timestamp");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_health_metrics_user_timestamp
        ON health_metrics (user_id, timestamp DESC)",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}

/// Create the user profiles table
fn create_user_profiles_table(conn: &Connection) -> Result<(), String> {
    info!("Creating user_profiles table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_profiles (
            user_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            condition TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('health_metrics', 'user_profiles')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }
}
