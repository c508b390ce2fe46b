//! Pure operations over the domain models
//!
//! Nothing here touches storage or the clock; callers pass in everything.

pub mod format;
pub mod reindex;
pub mod stats;

pub use format::{format_duration, format_weight};
pub use reindex::{reindex, Ordered};
pub use stats::{weekly_summary, WorkoutSummary};
