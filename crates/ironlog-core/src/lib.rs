//! IronLog Core - domain kernel for the workout tracker
//!
//! This crate provides the foundational pieces shared by storage and
//! orchestration:
//! - Template and session aggregates (template → exercise, session → exercise → set)
//! - The structured error facility (`ExError`, `ExErrorKind`, `IronLogError`)
//! - The structured logging facility and its operation macros
//! - Pure operations: child reindexing, session statistics, display formatting
//! - Input validation applied at the repository boundary
//! - The wall-clock workout timer with persist/restore support

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod rules;
pub mod timer;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, IronLogError, Result};
pub use model::{
    Session, SessionExercise, Template, TemplateExercise, TimerSnapshot, TimerState, WorkoutSet,
};
pub use timer::{Clock, ManualClock, SharedTimer, SystemClock, Ticker, TimerPhase, WorkoutTimer};
