//! IronLog Store - SQLite persistence for templates, sessions and app state
//!
//! Provides:
//! - `StorageHandle`: the single connection, with scoped cursors and transactions
//! - `StoreConfig`: database location and pragmas, loaded from TOML
//! - Forward-only versioned migrations, including the default template seed
//! - Aggregate repositories for templates and sessions
//! - The cross-session exercise history index
//! - The key/value application state store

pub mod config;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod state;

// Re-export key types
pub use config::StoreConfig;
pub use db::StorageHandle;
pub use errors::Result;
pub use migrations::apply_migrations;
pub use repo::{ChildStrategy, ExerciseHistoryIndex, SessionRepository, TemplateRepository};
pub use state::KeyValueStateStore;
