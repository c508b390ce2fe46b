//! Embedded migrations
//!
//! Schema SQL is embedded at compile time using include_str!; data
//! migrations are plain functions. Every body must be safe to re-run.

use rusqlite::Connection;

use crate::errors::{from_rusqlite, Result};
use crate::migrations::seed::seed_templates;

/// Migration metadata
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub apply: fn(&Connection) -> Result<()>,
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("version", &self.version)
            .field("name", &self.name)
            .finish()
    }
}

/// Get all embedded migrations in ascending version order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            name: "initial_schema",
            apply: initial_schema,
        },
        Migration {
            version: 2,
            name: "seed_templates",
            apply: seed_templates,
        },
    ]
}

fn initial_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(include_str!("../../migrations/001_initial_schema.sql"))
        .map_err(from_rusqlite)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_strictly_increase() {
        let versions: Vec<u32> = get_migrations().iter().map(|m| m.version).collect();
        assert_eq!(versions[0], 1);
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
    }
}
