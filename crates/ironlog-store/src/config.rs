//! Store configuration
//!
//! Loaded from an optional TOML file; every key has a default so an empty
//! file (or no file at all) is valid. `IRONLOG_DB_PATH` overrides the
//! database location.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{config_error, io_error, Result};

/// Environment variable that overrides `db_path`
pub const DB_PATH_ENV: &str = "IRONLOG_DB_PATH";

/// SQLite journal mode applied when the connection opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    #[default]
    Wal,
    Delete,
    Truncate,
}

impl JournalMode {
    pub fn as_pragma(&self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
            JournalMode::Truncate => "TRUNCATE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub journal_mode: JournalMode,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            journal_mode: JournalMode::Wal,
            busy_timeout_ms: 5000,
        }
    }
}

impl StoreConfig {
    /// Config for a database at `path`, other settings defaulted
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: path.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| config_error(format!("Invalid config: {}", e)))
    }

    /// Read a TOML file and apply the environment override
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| io_error("load_config", e))?;
        Ok(Self::from_toml_str(&contents)?.with_env_overrides())
    }

    /// Defaults plus the environment override, for hosts with no config file
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_db_path_override(std::env::var(DB_PATH_ENV).ok())
    }

    /// Replace `db_path` when an override is present and non-blank
    pub fn with_db_path_override(mut self, value: Option<String>) -> Self {
        if let Some(value) = value {
            if !value.trim().is_empty() {
                self.db_path = PathBuf::from(value);
            }
        }
        self
    }
}

/// `~/.ironlog/ironlog.db`, or `ironlog.db` in the working directory
/// when no home directory can be determined
pub fn default_db_path() -> PathBuf {
    db_path_in(dirs::home_dir())
}

fn db_path_in(home: Option<PathBuf>) -> PathBuf {
    match home {
        Some(home) if !home.as_os_str().is_empty() => home.join(".ironlog").join("ironlog.db"),
        _ => PathBuf::from("ironlog.db"),
    }
}
