//! Aggregate statistics over loaded sessions

use chrono::{DateTime, Duration, Utc};

use crate::model::Session;

/// Totals over a window of sessions
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorkoutSummary {
    pub workouts: usize,
    pub sets: usize,
    pub reps: i64,
    pub volume: f64,
}

impl WorkoutSummary {
    fn add(mut self, session: &Session) -> Self {
        self.workouts += 1;
        self.sets += session.total_sets();
        self.reps += session.total_reps();
        self.volume += session.total_volume();
        self
    }
}

/// Summarize sessions started within the seven days before `now`
pub fn weekly_summary(sessions: &[Session], now: DateTime<Utc>) -> WorkoutSummary {
    let week_ago = now - Duration::days(7);
    sessions
        .iter()
        .filter(|s| s.started_at >= week_ago)
        .fold(WorkoutSummary::default(), WorkoutSummary::add)
}
