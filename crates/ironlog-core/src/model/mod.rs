pub mod session;
pub mod template;
pub mod timer_state;

pub use session::{Session, SessionExercise, WorkoutSet};
pub use template::{Template, TemplateExercise};
pub use timer_state::{TimerSnapshot, TimerState, TIMER_SNAPSHOT_VERSION};

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the precision the store persists (microseconds)
///
/// Entities take their creation timestamp from here so that a save/load
/// round trip reproduces the value exactly.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
