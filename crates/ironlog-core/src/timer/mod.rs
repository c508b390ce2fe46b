//! Wall-clock workout timer
//!
//! Elapsed time is always derived from timestamps (`accumulated_seconds` plus
//! `now - start_time` while running), never from counted ticks. The periodic
//! ticker only refreshes displays.

pub mod clock;
pub mod ticker;
pub mod workout_timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ticker::{SharedTimer, Ticker};
pub use workout_timer::{TimerPhase, WorkoutTimer};
