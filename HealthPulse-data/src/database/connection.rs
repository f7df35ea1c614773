//! Database connection module for the HealthPulse application
//!
//! Metrics and profiles live in SQLite, either file-backed (default) or in
//! memory. The pool is created once at startup and shared process-wide.

use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use once_cell::sync::OnceCell;
use tracing::{error, info, warn};

use super::migrations::run_sqlite_migrations;
use super::DatabaseError;

/// Global database pool used throughout the application
static DB_POOL: OnceCell<DatabasePool> = OnceCell::new();

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite database (file-based)
    Sqlite,
    /// SQLite database held in memory, lost on restart
    Memory,
}

impl FromStr for DatabaseType {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            "memory" | "in-memory" => Ok(DatabaseType::Memory),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Database connection pool
#[derive(Debug, Clone)]
pub enum DatabasePool {
    /// SQLite connection pool
    SQLite(Arc<r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>>),
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database type (sqlite, memory)
    pub db_type: DatabaseType,
    /// Path to SQLite database file
    pub sqlite_path: Option<String>,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: Some("./data/health_pulse.db".to_string()),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let db_type_str = env::var("DB_TYPE").unwrap_or_else(|_| "sqlite".to_string());
        let db_type = db_type_str.parse::<DatabaseType>()?;

        let sqlite_path = env::var("DB_SQLITE_PATH").ok();

        match db_type {
            DatabaseType::Sqlite => {
                if let Some(ref path) = sqlite_path {
                    info!("Using SQLite database at: {}", path);
                } else {
                    info!("No DB_SQLITE_PATH provided, will use default path: data/health_pulse.db");
                }
            },
            DatabaseType::Memory => {
                info!("Using in-memory SQLite database");
            },
        }

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        info!("Database configuration: max_connections={}, timeout={}s",
            max_connections, timeout_seconds);

        Ok(DatabaseConfig {
            db_type,
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }
}

/// Initialize the global database connection pool from the environment
pub fn initialize_database_pool() -> Result<(), DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    let config = DatabaseConfig::from_env()?;
    let pool = create_pool(&config)?;

    DB_POOL.set(pool).map_err(|_| DatabaseError::PoolAlreadyInitialized)
}

/// Create a migrated pool for the given configuration without registering it globally
pub fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!("Initializing database pool with type: {:?}", config.db_type);

    let pool = match config.db_type {
        DatabaseType::Sqlite => initialize_sqlite_pool(config)?,
        DatabaseType::Memory => initialize_in_memory_sqlite_pool(config)?,
    };

    run_migrations(&pool)?;
    Ok(pool)
}

/// Create a migrated in-memory pool, mostly useful for tests
pub fn create_in_memory_pool() -> Result<DatabasePool, DatabaseError> {
    create_pool(&DatabaseConfig {
        db_type: DatabaseType::Memory,
        sqlite_path: None,
        ..DatabaseConfig::default()
    })
}

/// Get the database connection pool
pub fn get_db_pool() -> Result<DatabasePool, DatabaseError> {
    DB_POOL.get()
        .cloned()
        .ok_or(DatabaseError::PoolNotInitialized)
}

/// Initialize SQLite connection pool
fn initialize_sqlite_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    use rusqlite::OpenFlags;
    use std::fs;
    use std::path::Path;

    let sqlite_path = config.sqlite_path.clone()
        .unwrap_or_else(|| "data/health_pulse.db".to_string());

    info!("Initializing SQLite database at: {}", sqlite_path);

    if let Some(parent) = Path::new(&sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create directory: {}, falling back to in-memory database", e);
                return initialize_in_memory_sqlite_pool(config);
            }
        }
    }

    let manager = r2d2_sqlite::SqliteConnectionManager::file(&sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    match r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager) {
            Ok(pool) => {
                match pool.get() {
                    Ok(_) => {
                        info!("SQLite connection pool created successfully");
                        Ok(DatabasePool::SQLite(Arc::new(pool)))
                    },
                    Err(e) => {
                        error!("Failed to connect to SQLite database: {}", e);
                        warn!("Falling back to in-memory SQLite database");
                        initialize_in_memory_sqlite_pool(config)
                    }
                }
            },
            Err(e) => {
                error!("Failed to create SQLite connection pool: {}", e);
                warn!("Falling back to in-memory SQLite database");
                initialize_in_memory_sqlite_pool(config)
            }
        }
}

/// Initialize an in-memory SQLite database
fn initialize_in_memory_sqlite_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!("Initializing in-memory SQLite database");

    let manager = r2d2_sqlite::SqliteConnectionManager::memory();
    let pool = in_memory_pool_builder(config).build(manager)?;

    info!("In-memory SQLite database initialized successfully");
    Ok(DatabasePool::SQLite(Arc::new(pool)))
}

/// Every in-memory connection is its own database, so the pool holds exactly
/// one and never retires it
fn in_memory_pool_builder(config: &DatabaseConfig) -> r2d2::Builder<r2d2_sqlite::SqliteConnectionManager> {
    r2d2::Pool::builder()
        .max_size(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
}

/// Run database migrations against a pool
fn run_migrations(pool: &DatabasePool) -> Result<(), DatabaseError> {
    info!("Running database migrations");

    match pool {
        DatabasePool::SQLite(pool) => {
            let conn = pool.get()?;
            run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)?;
        },
    }

    info!("Database migrations completed successfully");
    Ok(())
}

/// Get information about the current database connection
pub fn get_connection_info() -> Option<String> {
    let pool = DB_POOL.get()?;

    match pool {
        DatabasePool::SQLite(pool) => {
            match pool.get() {
                Ok(conn) => {
                    let connection_info = match conn.query_row(
                        "PRAGMA database_list",
                        [],
                        |row| row.get::<_, String>(2),
                    ) {
                        Ok(path) if path.is_empty() || path == ":memory:" => {
                            "SQLite in-memory database".to_string()
                        },
                        Ok(path) => format!("SQLite database at {}", path),
                        Err(_) => "SQLite database (path unknown)".to_string(),
                    };

                    let state = pool.state();
                    Some(format!("{} (connections: active={}, idle={}) healthy",
                        connection_info,
                        state.connections,
                        state.idle_connections
                    ))
                },
                Err(e) => {
                    error!("Failed to get SQLite connection: {}", e);
                    Some(format!("SQLite connection error: {}", e))
                }
            }
        },
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.db_type, DatabaseType::Sqlite);
        assert!(config.sqlite_path.is_some());
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_database_type_from_str() {
        assert_eq!("sqlite".parse::<DatabaseType>().unwrap(), DatabaseType::Sqlite);
        assert_eq!("SQLite".parse::<DatabaseType>().unwrap(), DatabaseType::Sqlite);
        assert_eq!("memory".parse::<DatabaseType>().unwrap(), DatabaseType::Memory);
        assert!("postgres".parse::<DatabaseType>().is_err());
    }

    #[test]
    fn test_in_memory_connection_is_never_reaped() {
        let builder = format!("{:?}", in_memory_pool_builder(&DatabaseConfig::default()));

        assert!(builder.contains("max_size: 1"), "{builder}");
        assert!(builder.contains("idle_timeout: None"), "{builder}");
        assert!(builder.contains("max_lifetime: None"), "{builder}");
    }

    #[test]
    fn test_create_in_memory_pool_runs_migrations() {
        let DatabasePool::SQLite(pool) = create_in_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM health_metrics", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
