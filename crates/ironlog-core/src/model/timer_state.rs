use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Layout version written into every persisted timer snapshot
pub const TIMER_SNAPSHOT_VERSION: u32 = 1;

/// Timer value snapshot
///
/// Has no identity of its own: it is replaced wholesale on every timer
/// transition. `accumulated_seconds` is the time banked before the current
/// running segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    pub is_running: bool,
    pub is_paused: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub pause_time: Option<DateTime<Utc>>,
    pub accumulated_seconds: f64,
}

impl TimerState {
    /// The Stopped snapshot
    pub fn initial() -> Self {
        Self {
            is_running: false,
            is_paused: false,
            start_time: None,
            pause_time: None,
            accumulated_seconds: 0.0,
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Versioned on-disk form of a [`TimerState`]
///
/// The JSON object carries the five state fields plus `format_version`.
/// Snapshots written before versioning have no `format_version`; they share
/// the v1 layout and decode as v1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    #[serde(default = "unversioned_layout")]
    pub format_version: u32,
    pub is_running: bool,
    pub is_paused: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub pause_time: Option<DateTime<Utc>>,
    pub accumulated_seconds: f64,
}

fn unversioned_layout() -> u32 {
    1
}

impl TimerSnapshot {
    pub fn from_state(state: &TimerState) -> Self {
        Self {
            format_version: TIMER_SNAPSHOT_VERSION,
            is_running: state.is_running,
            is_paused: state.is_paused,
            start_time: state.start_time,
            pause_time: state.pause_time,
            accumulated_seconds: state.accumulated_seconds,
        }
    }

    /// Serialize to the JSON stored under the `timer_state` key
    pub fn encode(state: &TimerState) -> Result<String> {
        Ok(serde_json::to_string(&Self::from_state(state))?)
    }

    /// Parse a stored snapshot
    ///
    /// Any malformed payload, or one written by a newer layout, yields
    /// `None` ("no saved state") after a warning.
    pub fn decode(raw: &str) -> Option<TimerState> {
        let snapshot: TimerSnapshot = match serde_json::from_str(raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    component = module_path!(),
                    op = "decode_timer_snapshot",
                    error = %e,
                    "discarding unreadable timer snapshot"
                );
                return None;
            }
        };

        if snapshot.format_version != TIMER_SNAPSHOT_VERSION {
            tracing::warn!(
                component = module_path!(),
                op = "decode_timer_snapshot",
                format_version = snapshot.format_version,
                "discarding timer snapshot with unsupported layout"
            );
            return None;
        }

        if !snapshot.accumulated_seconds.is_finite() || snapshot.accumulated_seconds < 0.0 {
            tracing::warn!(
                component = module_path!(),
                op = "decode_timer_snapshot",
                accumulated_seconds = snapshot.accumulated_seconds,
                "discarding timer snapshot with invalid accumulated time"
            );
            return None;
        }

        Some(TimerState {
            is_running: snapshot.is_running,
            is_paused: snapshot.is_paused,
            start_time: snapshot.start_time,
            pause_time: snapshot.pause_time,
            accumulated_seconds: snapshot.accumulated_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_encode_decode_running_state() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap();
        let state = TimerState {
            is_running: true,
            is_paused: false,
            start_time: Some(start),
            pause_time: None,
            accumulated_seconds: 42.5,
        };

        let raw = TimerSnapshot::encode(&state).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["format_version"], 1);
        assert_eq!(value["is_running"], true);
        assert!(value["pause_time"].is_null());

        assert_eq!(TimerSnapshot::decode(&raw), Some(state));
    }

    #[test]
    fn test_decode_unversioned_snapshot() {
        let raw = r#"{"is_running": true, "is_paused": true,
            "start_time": "2024-03-01T18:00:00Z", "pause_time": "2024-03-01T18:10:00Z",
            "accumulated_seconds": 600.0}"#;
        let state = TimerSnapshot::decode(raw).expect("legacy layout should decode");
        assert!(state.is_paused);
        assert_eq!(state.accumulated_seconds, 600.0);
    }

    #[test]
    fn test_decode_garbage_is_no_saved_state() {
        assert_eq!(TimerSnapshot::decode("not json"), None);
        assert_eq!(TimerSnapshot::decode(r#"{"is_running": true}"#), None);
    }

    #[test]
    fn test_decode_future_version_is_no_saved_state() {
        let raw = r#"{"format_version": 2, "is_running": false, "is_paused": false,
            "start_time": null, "pause_time": null, "accumulated_seconds": 0.0}"#;
        assert_eq!(TimerSnapshot::decode(raw), None);
    }
}
