pub mod admin_repo;
pub mod message_repo;
pub mod records;

use crate::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

pub type DbPool = Pool<Sqlite>;

/// Initializes the database connection pool.
///
/// File-backed databases are created on first use, including their parent directory.
///
/// # Errors
/// Returns `sqlx::Error` if the URL is malformed or the connection fails.
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let mut options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true).foreign_keys(true);

    let in_memory = is_in_memory(&config.url);
    if !in_memory {
        if let Some(parent) = options.get_filename().parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));

    // An in-memory database lives only as long as one of its connections.
    if in_memory {
        pool_options = pool_options.min_connections(1).idle_timeout(None).max_lifetime(None);
    }

    pool_options.connect_with(options).await
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// In-memory database with the schema applied, for unit tests.
#[cfg(test)]
pub(crate) async fn test_pool() -> DbPool {
    let config = DatabaseConfig { url: "sqlite::memory:".to_string(), max_connections: 1, acquire_timeout_secs: 5 };
    let pool = init_pool(&config).await.expect("in-memory pool");
    crate::run_migrations(&pool).await.expect("migrations");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> DatabaseConfig {
        DatabaseConfig { url: url.to_string(), max_connections: 1, acquire_timeout_secs: 5 }
    }

    #[test]
    fn test_detects_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://relay?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://data/relay.db"));
    }

    #[tokio::test]
    async fn test_file_database_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("relay.db");
        let url = format!("sqlite://{}", db_path.display());

        let pool = init_pool(&config(&url)).await.unwrap();
        sqlx::query("SELECT 1").execute(&pool).await.unwrap();
        pool.close().await;

        assert!(db_path.exists());
    }
}
