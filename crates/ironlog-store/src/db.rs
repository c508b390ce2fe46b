//! Database connection management
//!
//! `StorageHandle` owns the single SQLite connection. Foreign keys and the
//! journal mode are configured once, when the connection opens, and apply to
//! every later transaction.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, Transaction};

use crate::config::StoreConfig;
use crate::errors::{from_rusqlite, io_error, Result};
use crate::migrations::seed::seed_templates;

/// Tables holding user data, children before parents
const DATA_TABLES: [&str; 6] = [
    "sets",
    "session_exercises",
    "workout_sessions",
    "template_exercises",
    "workout_templates",
    "app_state",
];

/// The single connection to the embedded store
#[derive(Debug)]
pub struct StorageHandle {
    conn: Connection,
    path: Option<PathBuf>,
}

impl StorageHandle {
    /// Open (or create) a database file with default settings
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(&StoreConfig::at_path(path.as_ref()))
    }

    /// Open the database described by `config`, creating its directory
    pub fn open_with_config(config: &StoreConfig) -> Result<Self> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| io_error("open_database", e))?;
            }
        }

        let conn = Connection::open(&config.db_path).map_err(from_rusqlite)?;
        configure(&conn, config)?;
        tracing::debug!(
            component = module_path!(),
            op = "open_database",
            path = %config.db_path.display(),
        );

        Ok(Self {
            conn,
            path: Some(config.db_path.clone()),
        })
    }

    /// Open a private in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(from_rusqlite)?;
        configure(&conn, &StoreConfig::default())?;
        Ok(Self { conn, path: None })
    }

    /// File backing this handle; `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run a read scope against the connection
    pub fn cursor<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        f(&self.conn)
    }

    /// Run a write scope atomically
    ///
    /// Commits once if `f` succeeds. If `f` fails, the whole scope is rolled
    /// back and the original error is returned unchanged.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let tx = self.conn.unchecked_transaction().map_err(from_rusqlite)?;
        match f(&tx) {
            Ok(value) => {
                tx.commit().map_err(from_rusqlite)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    tracing::warn!(
                        component = module_path!(),
                        op = "rollback",
                        error = %rollback_err,
                        "rollback failed"
                    );
                }
                Err(err)
            }
        }
    }

    /// Delete every row of user data and restore the default templates
    ///
    /// Runs as one transaction. The schema and ledger are left intact; the
    /// template seed is re-applied directly since its ledger row remains.
    pub fn reset(&self) -> Result<()> {
        self.transaction(|tx| {
            for table in DATA_TABLES {
                let removed = tx
                    .execute(&format!("DELETE FROM {}", table), [])
                    .map_err(from_rusqlite)?;
                tracing::debug!(
                    component = module_path!(),
                    op = "reset",
                    table = table,
                    row_count = removed as u64,
                );
            }
            seed_templates(tx)
        })
    }
}

/// Apply connection pragmas
fn configure(conn: &Connection, config: &StoreConfig) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", true)
        .map_err(from_rusqlite)?;

    let mode: String = conn
        .pragma_update_and_check(None, "journal_mode", config.journal_mode.as_pragma(), |row| {
            row.get(0)
        })
        .map_err(from_rusqlite)?;

    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(from_rusqlite)?;

    tracing::debug!(
        component = module_path!(),
        op = "configure",
        journal_mode = %mode,
    );
    Ok(())
}
