//! Persisted application state

pub mod app_state;

pub use app_state::{KeyValueStateStore, ACTIVE_SESSION_ID, LAST_TEMPLATE_ID, TIMER_STATE};
