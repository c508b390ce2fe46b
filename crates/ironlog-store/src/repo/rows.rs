//! Row mapping helpers
//!
//! Ids are stored as hyphenated UUID text and timestamps as microseconds
//! since the Unix epoch. Values that fail to decode surface as conversion
//! errors rather than being replaced with defaults.

use chrono::{DateTime, Utc};
use ironlog_core::{Session, SessionExercise, Template, TemplateExercise, WorkoutSet};
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

pub fn id_text(id: Uuid) -> String {
    id.to_string()
}

pub fn micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

pub fn get_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn get_opt_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        Uuid::parse_str(&t)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

pub fn get_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let value: i64 = row.get(idx)?;
    timestamp_from_micros(idx, value)
}

pub fn get_opt_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let value: Option<i64> = row.get(idx)?;
    value.map(|v| timestamp_from_micros(idx, v)).transpose()
}

fn timestamp_from_micros(idx: usize, value: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(value)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, value))
}

pub const TEMPLATE_COLUMNS: &str = "id, name, created_at";

pub fn template_from_row(row: &Row<'_>) -> rusqlite::Result<Template> {
    Ok(Template {
        id: get_uuid(row, 0)?,
        name: row.get(1)?,
        created_at: get_timestamp(row, 2)?,
        exercises: Vec::new(),
    })
}

pub const TEMPLATE_EXERCISE_COLUMNS: &str = "id, template_id, name, order_index, uses_weight";

pub fn template_exercise_from_row(row: &Row<'_>) -> rusqlite::Result<TemplateExercise> {
    Ok(TemplateExercise {
        id: get_uuid(row, 0)?,
        template_id: get_uuid(row, 1)?,
        name: row.get(2)?,
        order_index: row.get(3)?,
        uses_weight: row.get(4)?,
    })
}

pub const SESSION_COLUMNS: &str =
    "id, template_id, template_name, started_at, ended_at, duration_seconds, notes";

pub fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: get_uuid(row, 0)?,
        template_id: get_opt_uuid(row, 1)?,
        template_name: row.get(2)?,
        started_at: get_timestamp(row, 3)?,
        ended_at: get_opt_timestamp(row, 4)?,
        duration_seconds: row.get(5)?,
        notes: row.get(6)?,
        exercises: Vec::new(),
    })
}

pub const SESSION_EXERCISE_COLUMNS: &str = "id, session_id, name, order_index, uses_weight";

pub fn session_exercise_from_row(row: &Row<'_>) -> rusqlite::Result<SessionExercise> {
    Ok(SessionExercise {
        id: get_uuid(row, 0)?,
        session_id: get_uuid(row, 1)?,
        name: row.get(2)?,
        order_index: row.get(3)?,
        uses_weight: row.get(4)?,
        sets: Vec::new(),
    })
}

pub const SET_COLUMNS: &str = "id, session_exercise_id, reps, weight, created_at";

pub fn set_from_row(row: &Row<'_>) -> rusqlite::Result<WorkoutSet> {
    Ok(WorkoutSet {
        id: get_uuid(row, 0)?,
        session_exercise_id: get_uuid(row, 1)?,
        reps: row.get(2)?,
        weight: row.get(3)?,
        created_at: get_timestamp(row, 4)?,
    })
}
