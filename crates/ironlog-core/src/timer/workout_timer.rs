use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::clock::{Clock, SystemClock};
use crate::model::TimerState;
use crate::ops::format::format_duration;

/// Observer called with the new snapshot after every transition
pub type StateObserver = Box<dyn FnMut(&TimerState) + Send>;

/// Observer called with the formatted elapsed time on each display tick
pub type TickObserver = Box<dyn FnMut(&str) + Send>;

/// The three timer states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Stopped,
    Running,
    Paused,
}

impl TimerPhase {
    /// Derive the phase from a snapshot's flags
    pub fn of(state: &TimerState) -> Self {
        if !state.is_running {
            TimerPhase::Stopped
        } else if state.is_paused {
            TimerPhase::Paused
        } else {
            TimerPhase::Running
        }
    }
}

/// Workout session timer with start/pause/resume/stop
///
/// Stays accurate across process suspension because elapsed time is
/// reconstructed from stored timestamps on every read.
pub struct WorkoutTimer {
    state: TimerState,
    clock: Arc<dyn Clock>,
    on_state_change: Option<StateObserver>,
    on_tick: Option<TickObserver>,
}

impl WorkoutTimer {
    /// Create a stopped timer reading time from `clock`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: TimerState::initial(),
            clock,
            on_state_change: None,
            on_tick: None,
        }
    }

    /// Create a stopped timer on the system clock
    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Register the state-change observer
    pub fn on_state_change<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&TimerState) + Send + 'static,
    {
        self.on_state_change = Some(Box::new(observer));
        self
    }

    /// Register the display-tick observer
    pub fn on_tick<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_tick = Some(Box::new(observer));
        self
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn phase(&self) -> TimerPhase {
        TimerPhase::of(&self.state)
    }

    /// Running and not paused
    pub fn is_running(&self) -> bool {
        self.phase() == TimerPhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase() == TimerPhase::Paused
    }

    pub fn is_stopped(&self) -> bool {
        self.phase() == TimerPhase::Stopped
    }

    /// Elapsed time in fractional seconds
    ///
    /// Stopped and Paused report the banked time only; Running adds the
    /// current segment measured against the clock.
    pub fn elapsed(&self) -> f64 {
        self.elapsed_at(self.clock.now())
    }

    /// Elapsed time truncated to whole seconds
    pub fn elapsed_seconds(&self) -> i64 {
        self.elapsed().floor() as i64
    }

    /// Elapsed time as "H:MM:SS" or "M:SS"
    pub fn formatted_time(&self) -> String {
        format_duration(self.elapsed_seconds())
    }

    fn elapsed_at(&self, now: DateTime<Utc>) -> f64 {
        match (self.phase(), self.state.start_time) {
            (TimerPhase::Running, Some(start)) => {
                self.state.accumulated_seconds + segment_seconds(start, now)
            }
            _ => self.state.accumulated_seconds,
        }
    }

    /// Stopped → Running; no-op otherwise
    pub fn start(&mut self) {
        if !self.is_stopped() {
            return;
        }
        let now = self.clock.now();
        self.transition(
            "timer_start",
            TimerState {
                is_running: true,
                is_paused: false,
                start_time: Some(now),
                pause_time: None,
                accumulated_seconds: 0.0,
            },
        );
    }

    /// Running → Paused, banking the current segment; no-op otherwise
    pub fn pause(&mut self) {
        if !self.is_running() {
            return;
        }
        let now = self.clock.now();
        let banked = self.elapsed_at(now);
        self.transition(
            "timer_pause",
            TimerState {
                is_running: true,
                is_paused: true,
                start_time: self.state.start_time,
                pause_time: Some(now),
                accumulated_seconds: banked,
            },
        );
    }

    /// Paused → Running with a new segment start; no-op otherwise
    pub fn resume(&mut self) {
        if !self.is_paused() {
            return;
        }
        let now = self.clock.now();
        self.transition(
            "timer_resume",
            TimerState {
                is_running: true,
                is_paused: false,
                start_time: Some(now),
                pause_time: None,
                accumulated_seconds: self.state.accumulated_seconds,
            },
        );
    }

    /// Running or Paused → Stopped; returns the final elapsed whole seconds
    ///
    /// Calling this on a stopped timer reports its banked time and changes
    /// nothing.
    pub fn stop(&mut self) -> i64 {
        let final_seconds = self.elapsed_seconds();
        if self.is_stopped() {
            return final_seconds;
        }
        self.transition("timer_stop", TimerState::initial());
        final_seconds
    }

    /// Adopt a persisted snapshot verbatim
    ///
    /// A restored Running snapshot naturally includes all real time since
    /// its `start_time`, including time the process was not alive. Observers
    /// are not notified; the snapshot is already persisted.
    pub fn restore(&mut self, state: TimerState) {
        tracing::debug!(
            component = module_path!(),
            op = "timer_restore",
            phase = ?TimerPhase::of(&state),
            accumulated_seconds = state.accumulated_seconds,
        );
        self.state = state;
    }

    /// Emit the formatted elapsed time to the tick observer while Running
    pub fn tick(&mut self) {
        if !self.is_running() {
            return;
        }
        let formatted = self.formatted_time();
        if let Some(observer) = self.on_tick.as_mut() {
            observer(&formatted);
        }
    }

    fn transition(&mut self, op: &'static str, next: TimerState) {
        self.state = next;
        tracing::debug!(
            component = module_path!(),
            op = op,
            phase = ?self.phase(),
            accumulated_seconds = self.state.accumulated_seconds,
        );
        if let Some(observer) = self.on_state_change.as_mut() {
            observer(&self.state);
        }
    }
}

impl std::fmt::Debug for WorkoutTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkoutTimer")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Seconds from `start` to `now`, never negative
fn segment_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let delta = now.signed_duration_since(start);
    match delta.num_microseconds() {
        Some(micros) => (micros.max(0) as f64) / 1_000_000.0,
        None => delta.num_milliseconds().max(0) as f64 / 1_000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::clock::ManualClock;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    fn timer_at_noon() -> (WorkoutTimer, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        let timer = WorkoutTimer::new(Arc::new(clock.clone()));
        (timer, clock)
    }

    #[test]
    fn test_starts_stopped_at_zero() {
        let (timer, _clock) = timer_at_noon();
        assert!(timer.is_stopped());
        assert_eq!(timer.elapsed_seconds(), 0);
        assert_eq!(timer.formatted_time(), "0:00");
    }

    #[test]
    fn test_start_pause_resume_phases() {
        let (mut timer, _clock) = timer_at_noon();
        timer.start();
        assert!(timer.is_running());
        timer.pause();
        assert!(timer.is_paused());
        assert!(!timer.is_running());
        timer.resume();
        assert!(timer.is_running());
        assert!(!timer.is_paused());
    }

    #[test]
    fn test_elapsed_is_additive_across_pause() {
        let (mut timer, clock) = timer_at_noon();
        timer.start();
        clock.advance(Duration::seconds(30));
        timer.pause();
        assert_eq!(timer.elapsed_seconds(), 30);

        timer.resume();
        clock.advance(Duration::seconds(30));
        assert_eq!(timer.elapsed_seconds(), 60);

        assert_eq!(timer.stop(), 60);
        assert!(timer.is_stopped());
        assert_eq!(timer.state(), &TimerState::initial());
    }

    #[test]
    fn test_pause_plateau() {
        let (mut timer, clock) = timer_at_noon();
        timer.start();
        clock.advance(Duration::seconds(30));
        timer.pause();
        let paused = timer.elapsed();

        clock.advance(Duration::minutes(10));
        assert_eq!(timer.elapsed(), paused);
        assert_eq!(timer.stop(), 30);
    }

    #[test]
    fn test_invalid_transitions_are_noops() {
        let (mut timer, clock) = timer_at_noon();
        let notified = Arc::new(Mutex::new(0usize));
        let counter = notified.clone();
        timer = timer.on_state_change(move |_| *counter.lock().unwrap() += 1);

        timer.pause();
        timer.resume();
        assert!(timer.is_stopped());

        timer.start();
        let started_at = timer.state().start_time;
        clock.advance(Duration::seconds(5));
        timer.start();
        timer.resume();
        assert_eq!(timer.state().start_time, started_at);

        timer.pause();
        timer.pause();
        assert_eq!(*notified.lock().unwrap(), 2);
    }

    #[test]
    fn test_observer_receives_each_snapshot() {
        let (timer, clock) = timer_at_noon();
        let seen: Arc<Mutex<Vec<TimerState>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut timer = timer.on_state_change(move |s| sink.lock().unwrap().push(s.clone()));

        timer.start();
        clock.advance(Duration::seconds(45));
        timer.pause();
        timer.resume();
        timer.stop();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert!(seen[0].is_running && !seen[0].is_paused);
        assert!(seen[1].is_paused);
        assert_eq!(seen[1].accumulated_seconds, 45.0);
        assert_eq!(seen[1].pause_time, Some(clock.now()));
        assert_eq!(seen[2].accumulated_seconds, 45.0);
        assert_eq!(seen[2].start_time, Some(clock.now()));
        assert_eq!(seen[3], TimerState::initial());
    }

    #[test]
    fn test_restore_running_includes_downtime() {
        let (mut timer, clock) = timer_at_noon();
        let snapshot = TimerState {
            is_running: true,
            is_paused: false,
            start_time: Some(clock.now()),
            pause_time: None,
            accumulated_seconds: 120.0,
        };

        // Process was gone for an hour
        clock.advance(Duration::hours(1));
        timer.restore(snapshot.clone());

        assert_eq!(timer.state(), &snapshot);
        assert_eq!(timer.elapsed_seconds(), 3600 + 120);
        assert_eq!(timer.formatted_time(), "1:02:00");
    }

    #[test]
    fn test_restore_paused_keeps_banked_time() {
        let (mut timer, clock) = timer_at_noon();
        timer.restore(TimerState {
            is_running: true,
            is_paused: true,
            start_time: Some(clock.now()),
            pause_time: Some(clock.now()),
            accumulated_seconds: 90.0,
        });
        clock.advance(Duration::hours(2));
        assert!(timer.is_paused());
        assert_eq!(timer.elapsed_seconds(), 90);
        timer.resume();
        clock.advance(Duration::seconds(10));
        assert_eq!(timer.stop(), 100);
    }

    #[test]
    fn test_tick_only_while_running() {
        let (timer, clock) = timer_at_noon();
        let ticks: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = ticks.clone();
        let mut timer = timer.on_tick(move |t| sink.lock().unwrap().push(t.to_string()));

        timer.tick();
        timer.start();
        clock.advance(Duration::seconds(65));
        timer.tick();
        timer.pause();
        timer.tick();
        timer.resume();
        clock.advance(Duration::seconds(3600));
        timer.tick();

        assert_eq!(*ticks.lock().unwrap(), vec!["1:05", "1:01:05"]);
    }

    #[test]
    fn test_clock_going_backwards_does_not_go_negative() {
        let (mut timer, clock) = timer_at_noon();
        timer.start();
        clock.advance(Duration::seconds(-30));
        assert_eq!(timer.elapsed_seconds(), 0);
    }
}
