//! IronLog Engine - Workout orchestration
//!
//! Coordinates the repositories, the application state store and the
//! workout timer into the workflows a front end drives.

pub mod commands;

pub use commands::timer::{persist_timer_state, restore_timer, SharedStorage};
pub use commands::workout::{
    add_exercise, discard_active_workout, end_workout, log_set, start_empty_workout,
    start_workout_from_template,
};
