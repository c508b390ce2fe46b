use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::workout_timer::WorkoutTimer;

/// A timer shared between its owner and the display ticker
pub type SharedTimer = Arc<Mutex<WorkoutTimer>>;

/// Periodic display refresh for a [`WorkoutTimer`]
///
/// Each period calls [`WorkoutTimer::tick`], which forwards the formatted
/// elapsed time to the tick observer while the timer is Running. Missed
/// periods are skipped rather than replayed; elapsed time never depends on
/// how many ticks fired. Dropping the ticker aborts its task.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn the ticker on the current tokio runtime
    pub fn spawn(timer: SharedTimer, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                timer.lock().unwrap_or_else(|e| e.into_inner()).tick();
            }
        });
        tracing::debug!(
            component = module_path!(),
            op = "ticker_spawn",
            period_ms = period.as_millis() as u64,
        );
        Self { handle }
    }

    /// Stop refreshing; the task is aborted on drop
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::clock::ManualClock;
    use chrono::{TimeZone, Utc};

    fn shared_timer() -> (SharedTimer, ManualClock, Arc<Mutex<Vec<String>>>) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap());
        let ticks: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = ticks.clone();
        let timer = WorkoutTimer::new(Arc::new(clock.clone()))
            .on_tick(move |t| sink.lock().unwrap().push(t.to_string()));
        (Arc::new(Mutex::new(timer)), clock, ticks)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_only_while_running() {
        let (timer, _clock, ticks) = shared_timer();
        timer.lock().unwrap().start();

        let ticker = Ticker::spawn(timer.clone(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(ticks.lock().unwrap().len(), 3);

        timer.lock().unwrap().pause();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(ticks.lock().unwrap().len(), 3);

        ticker.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_ticker_emits_nothing() {
        let (timer, clock, ticks) = shared_timer();
        timer.lock().unwrap().start();
        clock.advance(chrono::Duration::seconds(75));

        let ticker = Ticker::spawn(timer.clone(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        ticker.stop();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(*ticks.lock().unwrap(), vec!["1:15"]);
    }
}
