//! Migration runner
//!
//! Applies pending migrations in ascending version order. Each migration
//! body and its ledger row commit in separate transactions.

use std::time::Instant;

use ironlog_core::logging_facility::elapsed_ms;
use ironlog_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::OptionalExtension;

use crate::db::StorageHandle;
use crate::errors::{from_rusqlite, migration_error, Result};
use crate::migrations::embedded::{get_migrations, Migration};

/// Apply all pending migrations to the database
///
/// Returns the versions applied by this call (empty when already current).
/// The first failure aborts the run with `MigrationFailed`; versions applied
/// before it stay recorded.
pub fn apply_migrations(handle: &StorageHandle) -> Result<Vec<u32>> {
    log_op_start!("apply_migrations");
    let start = Instant::now();

    match apply_pending(handle) {
        Ok(applied) => {
            log_op_end!(
                "apply_migrations",
                duration_ms = elapsed_ms(start),
                row_count = applied.len() as u64
            );
            Ok(applied)
        }
        Err(e) => {
            log_op_error!("apply_migrations", e, duration_ms = elapsed_ms(start));
            Err(e)
        }
    }
}

/// Highest applied version, 0 for a fresh database
pub fn current_version(handle: &StorageHandle) -> Result<u32> {
    handle.cursor(|conn| {
        let has_ledger: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;
        if has_ledger.is_none() {
            return Ok(0);
        }
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)
    })
}

/// All ledger versions in ascending order
pub fn applied_versions(handle: &StorageHandle) -> Result<Vec<u32>> {
    handle.cursor(|conn| {
        let mut stmt = conn
            .prepare("SELECT version FROM schema_version ORDER BY version")
            .map_err(from_rusqlite)?;
        let versions = stmt
            .query_map([], |row| row.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<u32>, _>>()
            .map_err(from_rusqlite)?;
        Ok(versions)
    })
}

fn apply_pending(handle: &StorageHandle) -> Result<Vec<u32>> {
    create_schema_version_table(handle)?;
    let current = current_version(handle)?;

    let mut applied = Vec::new();
    for migration in get_migrations()
        .into_iter()
        .filter(|m| m.version > current)
    {
        apply_migration(handle, &migration)?;
        applied.push(migration.version);
    }
    Ok(applied)
}

/// Create the schema_version table if it doesn't exist
fn create_schema_version_table(handle: &StorageHandle) -> Result<()> {
    handle.transaction(|tx| {
        tx.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    })
}

fn apply_migration(handle: &StorageHandle, migration: &Migration) -> Result<()> {
    handle
        .transaction(|tx| (migration.apply)(tx))
        .map_err(|e| migration_error(migration.version, migration.name, e))?;

    // A crash between these two commits re-runs the body next startup,
    // which every embedded migration tolerates.
    handle
        .transaction(|tx| {
            tx.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![migration.version, chrono::Utc::now().timestamp_micros()],
            )
            .map_err(from_rusqlite)?;
            Ok(())
        })
        .map_err(|e| migration_error(migration.version, migration.name, e))?;

    tracing::debug!(
        component = module_path!(),
        op = "apply_migration",
        migration_version = migration.version,
        migration_name = migration.name,
    );
    Ok(())
}
