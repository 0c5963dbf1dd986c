pub mod core;
pub mod migrations;

use self::core::{DbClient, DbError};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Open a raw connection without running migrations
pub fn get_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {}", path.display()))?;
    enable_foreign_keys(&conn)?;
    Ok(conn)
}

fn enable_foreign_keys(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .context("Failed to enable foreign keys")
}

/// Shared database handle
///
/// Opened once at startup, cloned into request handlers, closed on shutdown.
/// SQLite calls are blocking, so [`Database::call`] runs them on the blocking
/// thread pool.
#[derive(Clone)]
pub struct Database {
    client: Arc<Mutex<DbClient>>,
}

impl Database {
    /// Open (or create) the database file and run pending migrations
    pub fn open(path: &Path) -> Result<Self> {
        Self::init(get_connection(path)?)
    }

    /// Open a private in-memory database with the schema applied
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        enable_foreign_keys(&conn)?;
        migrations::run_migrations(&conn)?;

        Ok(Self {
            client: Arc::new(Mutex::new(DbClient::new(conn))),
        })
    }

    /// Run `f` with exclusive access to the connection
    pub async fn call<F, R>(&self, f: F) -> Result<R, DbError>
    where
        F: FnOnce(&DbClient) -> Result<R, DbError> + Send + 'static,
        R: Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            let guard = client
                .lock()
                .map_err(|_| DbError::Unavailable("connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| DbError::Unavailable(e.to_string()))?
    }

    /// Close the connection if this is the last handle
    pub fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.client) {
            Ok(mutex) => {
                let client = mutex.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
                client.close().context("Failed to close database")?;
                tracing::info!("Database connection closed");
            }
            Err(_) => {
                tracing::warn!("Database handle still shared; connection closes with the last handle");
            }
        }
        Ok(())
    }
}
