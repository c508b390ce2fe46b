//! Migration framework
//!
//! Provides:
//! - Forward-only runner tracked in the `schema_version` ledger
//! - Idempotent application
//! - Embedded schema SQL and the default template seed

mod embedded;
mod runner;
pub(crate) mod seed;

pub use embedded::{get_migrations, Migration};
pub use runner::{applied_versions, apply_migrations, current_version};
