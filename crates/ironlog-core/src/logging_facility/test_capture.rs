//! In-memory event capture for logging assertions in tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event; every field is kept in its display form
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub op: Option<String>,
    pub event: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn is(&self, op: &str, event: &str) -> bool {
        self.op.as_deref() == Some(op) && self.event.as_deref() == Some(event)
    }
}

#[derive(Default)]
struct FieldVisitor {
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    // Numbers and bools fall through to this via their Debug form
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }
}

/// Layer that appends every event to a shared buffer
pub struct TestCaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCaptureLayer {
    pub fn new() -> (Self, TestCapture) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                events: events.clone(),
            },
            TestCapture { events },
        )
    }
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            op: visitor.fields.get("op").cloned(),
            event: visitor.fields.get("event").cloned(),
            fields: visitor.fields,
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(captured);
        }
    }
}

/// Read handle on the captured events
#[derive(Clone)]
pub struct TestCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// The most recent event for `op` with the given `event` name
    pub fn find(&self, op: &str, event: &str) -> Option<CapturedEvent> {
        self.events().into_iter().rev().find(|e| e.is(op, event))
    }

    /// # Panics
    ///
    /// Panics if no event for `op` with the given `event` name was captured
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        assert!(
            self.find(op, event).is_some(),
            "no {}/{} event among {} captured",
            op,
            event,
            self.events().len()
        );
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer globally (first call only) and return its handle
///
/// All tests in one process share the buffer, so assertions should filter
/// on their own op. If another global subscriber won the race, nothing is
/// captured.
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCaptureLayer::new();
            let _ = tracing_subscriber::registry().with(layer).try_init();
            capture
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::IronLogError;
    use crate::logging_facility::schema::{EVENT_END_ERROR, FIELD_ERR_CODE};
    use crate::model::TimerSnapshot;

    fn capture_local<F: FnOnce()>(f: F) -> TestCapture {
        let (layer, capture) = TestCaptureLayer::new();
        tracing::subscriber::with_default(tracing_subscriber::registry().with(layer), f);
        capture
    }

    #[test]
    fn test_error_event_carries_code() {
        let capture = capture_local(|| {
            let err = IronLogError::SessionNotFound {
                session_id: "s-9".to_string(),
            };
            crate::log_op_error!("end_workout", err, duration_ms = 3);
        });

        let event = capture
            .find("end_workout", EVENT_END_ERROR)
            .expect("error event captured");
        assert_eq!(event.level, Level::ERROR);
        assert_eq!(
            event.fields.get(FIELD_ERR_CODE).map(String::as_str),
            Some("ERR_NOT_FOUND")
        );
        assert_eq!(event.fields.get("duration_ms").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_unreadable_timer_snapshot_warns() {
        let capture = capture_local(|| {
            assert!(TimerSnapshot::decode("{ not json").is_none());
        });

        let warnings = capture.count_events(|e| {
            e.level == Level::WARN && e.op.as_deref() == Some("decode_timer_snapshot")
        });
        assert_eq!(warnings, 1);
    }
}
