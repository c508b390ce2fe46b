//! Workout lifecycle commands
//!
//! Starting, filling in, ending and discarding a session. Each command keeps
//! `active_session_id` in the state store in step with the session rows.

use std::time::Instant;

use ironlog_core::logging_facility::elapsed_ms;
use ironlog_core::{log_op_end, log_op_error, log_op_start};
use ironlog_core::{IronLogError, Session, SessionExercise, WorkoutSet, WorkoutTimer};
use ironlog_store::errors::Result;
use ironlog_store::{KeyValueStateStore, SessionRepository, StorageHandle, TemplateRepository};
use uuid::Uuid;

use crate::commands::timer::{lock_storage, SharedStorage};

/// Start a session with no template and make it the active one
///
/// Fails with `ConstraintViolation` if another session is active.
pub fn start_empty_workout(db: &StorageHandle) -> Result<Session> {
    log_op_start!("start_empty_workout");
    let start = Instant::now();

    let result = begin_session(db, Session::new()).map_err(|e| {
        log_op_error!("start_empty_workout", e, duration_ms = elapsed_ms(start));
        e
    })?;

    log_op_end!(
        "start_empty_workout",
        duration_ms = elapsed_ms(start),
        session_id = %result.id
    );
    Ok(result)
}

/// Start a session pre-filled with a template's exercises
///
/// The session keeps a copy of the template's id and name. The template
/// becomes `last_template_id`.
pub fn start_workout_from_template(db: &StorageHandle, template_id: Uuid) -> Result<Session> {
    log_op_start!("start_workout_from_template", template_id = %template_id);
    let start = Instant::now();

    let result = start_workout_from_template_impl(db, template_id).map_err(|e| {
        log_op_error!(
            "start_workout_from_template",
            e,
            duration_ms = elapsed_ms(start)
        );
        e
    })?;

    log_op_end!(
        "start_workout_from_template",
        duration_ms = elapsed_ms(start),
        session_id = %result.id,
        child_count = result.exercises.len() as u64
    );
    Ok(result)
}

fn start_workout_from_template_impl(db: &StorageHandle, template_id: Uuid) -> Result<Session> {
    let template = TemplateRepository::new(db)
        .get_by_id(template_id)?
        .ok_or_else(|| IronLogError::TemplateNotFound {
            template_id: template_id.to_string(),
        })?;

    let session = begin_session(db, Session::from_template(&template))?;
    KeyValueStateStore::new(db).set_last_template_id(Some(template.id))?;
    Ok(session)
}

fn begin_session(db: &StorageHandle, session: Session) -> Result<Session> {
    let sessions = SessionRepository::new(db);
    if let Some(active) = sessions.get_active()? {
        return Err(IronLogError::ActiveSessionExists {
            active_session_id: active.id.to_string(),
        }
        .into());
    }

    sessions.save(&session)?;
    for exercise in &session.exercises {
        sessions.save_exercise(exercise)?;
    }
    KeyValueStateStore::new(db).set_active_session_id(Some(session.id))?;
    Ok(session)
}

/// Append an exercise to a session
pub fn add_exercise(
    db: &StorageHandle,
    session_id: Uuid,
    name: &str,
    uses_weight: bool,
) -> Result<SessionExercise> {
    log_op_start!("add_exercise", session_id = %session_id);
    let start = Instant::now();

    let result = add_exercise_impl(db, session_id, name, uses_weight).map_err(|e| {
        log_op_error!("add_exercise", e, duration_ms = elapsed_ms(start));
        e
    })?;

    log_op_end!(
        "add_exercise",
        duration_ms = elapsed_ms(start),
        exercise_id = %result.id
    );
    Ok(result)
}

fn add_exercise_impl(
    db: &StorageHandle,
    session_id: Uuid,
    name: &str,
    uses_weight: bool,
) -> Result<SessionExercise> {
    let sessions = SessionRepository::new(db);
    let session = sessions
        .get_by_id(session_id)?
        .ok_or_else(|| IronLogError::SessionNotFound {
            session_id: session_id.to_string(),
        })?;

    let order_index = u32::try_from(session.exercises.len()).unwrap_or(u32::MAX);
    let exercise = SessionExercise::new(session_id, name.trim(), order_index, uses_weight);
    sessions.save_exercise(&exercise)?;
    Ok(exercise)
}

/// Record a set against an exercise
///
/// Validation follows the exercise's `uses_weight` flag.
pub fn log_set(
    db: &StorageHandle,
    exercise_id: Uuid,
    reps: i64,
    weight: Option<f64>,
) -> Result<WorkoutSet> {
    log_op_start!("log_set", exercise_id = %exercise_id);
    let start = Instant::now();

    let set = WorkoutSet::new(exercise_id, reps, weight);
    SessionRepository::new(db).save_set(&set).map_err(|e| {
        log_op_error!("log_set", e, duration_ms = elapsed_ms(start));
        e
    })?;

    log_op_end!("log_set", duration_ms = elapsed_ms(start), set_id = %set.id);
    Ok(set)
}

/// Stop the timer and close the session with the timer's final seconds
///
/// The session must exist and still be active; otherwise the call fails
/// before the timer is touched, so the running workout and its persisted
/// snapshot survive. Storage is unlocked while the timer stops, so a
/// [`persist_timer_state`](crate::persist_timer_state) observer on the same
/// storage can run. Clears `active_session_id` and `timer_state`.
pub fn end_workout(
    storage: &SharedStorage,
    session_id: Uuid,
    timer: &mut WorkoutTimer,
) -> Result<Session> {
    log_op_start!("end_workout", session_id = %session_id);
    let start = Instant::now();

    let result = end_workout_impl(storage, session_id, timer).map_err(|e| {
        log_op_error!("end_workout", e, duration_ms = elapsed_ms(start));
        e
    })?;

    log_op_end!(
        "end_workout",
        duration_ms = elapsed_ms(start),
        session_id = %session_id,
        workout_seconds = result.duration_seconds.unwrap_or_default()
    );
    Ok(result)
}

fn end_workout_impl(
    storage: &SharedStorage,
    session_id: Uuid,
    timer: &mut WorkoutTimer,
) -> Result<Session> {
    ensure_active(&lock_storage(storage), session_id)?;

    let duration_seconds = timer.stop();

    let db = lock_storage(storage);
    let sessions = SessionRepository::new(&db);
    if !sessions.end_session(session_id, duration_seconds)? {
        return Err(IronLogError::SessionNotFound {
            session_id: session_id.to_string(),
        }
        .into());
    }

    let state = KeyValueStateStore::new(&db);
    state.set_active_session_id(None)?;
    state.set_timer_state(None)?;

    let ended = sessions.get_by_id(session_id)?;
    ended.ok_or_else(|| {
        IronLogError::SessionNotFound {
            session_id: session_id.to_string(),
        }
        .into()
    })
}

fn ensure_active(db: &StorageHandle, session_id: Uuid) -> Result<()> {
    match SessionRepository::new(db).get_by_id(session_id)? {
        None => Err(IronLogError::SessionNotFound {
            session_id: session_id.to_string(),
        }
        .into()),
        Some(session) if !session.is_active() => Err(IronLogError::SessionAlreadyEnded {
            session_id: session_id.to_string(),
        }
        .into()),
        Some(_) => Ok(()),
    }
}

/// Delete the active session with everything in it
///
/// Returns the discarded session id, or `None` when nothing was active.
/// `active_session_id` and `timer_state` are cleared either way.
pub fn discard_active_workout(db: &StorageHandle) -> Result<Option<Uuid>> {
    log_op_start!("discard_active_workout");
    let start = Instant::now();

    let result = discard_active_workout_impl(db).map_err(|e| {
        log_op_error!("discard_active_workout", e, duration_ms = elapsed_ms(start));
        e
    })?;

    log_op_end!(
        "discard_active_workout",
        duration_ms = elapsed_ms(start),
        discarded = result.is_some()
    );
    Ok(result)
}

fn discard_active_workout_impl(db: &StorageHandle) -> Result<Option<Uuid>> {
    let sessions = SessionRepository::new(db);
    let state = KeyValueStateStore::new(db);

    let active = match sessions.get_active()? {
        Some(session) => Some(session.id),
        None => state.active_session_id()?,
    };
    if let Some(id) = active {
        sessions.delete(id)?;
    }

    state.set_active_session_id(None)?;
    state.set_timer_state(None)?;
    Ok(active)
}
