//! Core types shared across IronLog facilities
//!
//! Holds the canonical field keys and event names used by the structured
//! logging macros, so every crate emits the same schema.

pub mod schema;
