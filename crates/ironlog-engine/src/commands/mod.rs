//! Engine commands
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging for workflows:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()` for internal details.

pub mod timer;
pub mod workout;
