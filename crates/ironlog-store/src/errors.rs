//! Error handling for ironlog-store
//!
//! Wraps ironlog-core ExError with store-specific helpers

use ironlog_core::errors::{ExError, ExErrorKind};
use rusqlite::ErrorCode;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error wrapping the failure that aborted it
pub fn migration_error(version: u32, name: &str, cause: ExError) -> ExError {
    ExError::new(ExErrorKind::MigrationFailed)
        .with_op("apply_migrations")
        .with_entity_id(version.to_string())
        .with_message(format!("Migration {} ({}) failed: {}", version, name, cause.message()))
        .with_source(cause)
}

/// Create a database error from rusqlite::Error
///
/// Constraint failures (foreign keys, NOT NULL, primary keys) are classified
/// as `ConstraintViolation`; everything else is `Persistence`.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            ExErrorKind::ConstraintViolation
        }
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind).with_op("sqlite").with_message(err.to_string())
}

/// Create a configuration error
pub fn config_error(reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("load_config")
        .with_message(reason)
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_failures_are_classified() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id TEXT PRIMARY KEY, name TEXT NOT NULL)")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t (id, name) VALUES ('a', NULL)", [])
            .unwrap_err();
        assert_eq!(from_rusqlite(err).kind(), ExErrorKind::ConstraintViolation);

        let err = conn.execute("SELECT * FROM missing", []).unwrap_err();
        assert_eq!(from_rusqlite(err).kind(), ExErrorKind::Persistence);
    }

    #[test]
    fn test_migration_error_keeps_cause() {
        let cause = ExError::new(ExErrorKind::Persistence).with_message("no such table: x");
        let err = migration_error(2, "seed_templates", cause);
        assert_eq!(err.kind(), ExErrorKind::MigrationFailed);
        assert_eq!(err.entity_id(), Some("2"));
        assert!(err.message().contains("seed_templates"));
        assert_eq!(
            err.source_error().map(|e| e.message()),
            Some("no such table: x")
        );
    }
}
