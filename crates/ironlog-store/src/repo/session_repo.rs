//! Session repository
//!
//! Sessions persist with [`ChildStrategy::UpsertChild`]: sets are appended
//! continuously during a workout, so each exercise and set is written on its
//! own and `save` only touches the session row.

use ironlog_core::model::timestamp_now;
use ironlog_core::rules::{validate_name, validate_set};
use ironlog_core::{IronLogError, Session, SessionExercise, WorkoutSet};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::StorageHandle;
use crate::errors::{from_rusqlite, Result};
use crate::repo::rows::{
    get_uuid, id_text, micros, session_exercise_from_row, session_from_row, set_from_row,
    SESSION_COLUMNS, SESSION_EXERCISE_COLUMNS, SET_COLUMNS,
};
use crate::repo::strategy::{ChildStrategy, SESSION_EXERCISES, SETS};

pub struct SessionRepository<'a> {
    db: &'a StorageHandle,
}

impl<'a> SessionRepository<'a> {
    pub const CHILD_STRATEGY: ChildStrategy = ChildStrategy::UpsertChild;

    pub fn new(db: &'a StorageHandle) -> Self {
        Self { db }
    }

    /// Most recent sessions first, each with its full exercise/set tree
    pub fn list_recent(&self, limit: usize) -> Result<Vec<Session>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.db.cursor(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM workout_sessions ORDER BY started_at DESC, rowid DESC LIMIT ?1",
                    SESSION_COLUMNS
                ))
                .map_err(from_rusqlite)?;
            let sessions = stmt
                .query_map([limit], session_from_row)
                .map_err(from_rusqlite)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(from_rusqlite)?;

            sessions
                .into_iter()
                .map(|session| load_exercises(conn, session))
                .collect()
        })
    }

    pub fn get_by_id(&self, id: Uuid) -> Result<Option<Session>> {
        self.db.cursor(|conn| {
            let session = conn
                .query_row(
                    &format!("SELECT {} FROM workout_sessions WHERE id = ?1", SESSION_COLUMNS),
                    [id_text(id)],
                    session_from_row,
                )
                .optional()
                .map_err(from_rusqlite)?;
            session.map(|s| load_exercises(conn, s)).transpose()
        })
    }

    /// The session with no end time, most recent first if several exist
    pub fn get_active(&self) -> Result<Option<Session>> {
        let Some(id) = self.db.cursor(active_session_id)? else {
            return Ok(None);
        };
        self.get_by_id(id)
    }

    /// Upsert the session row only; exercises and sets are not touched
    ///
    /// Saving an active session fails with `ConstraintViolation` while a
    /// different session is active.
    pub fn save(&self, session: &Session) -> Result<()> {
        self.db.transaction(|tx| {
            if session.is_active() {
                if let Some(active) = active_session_id(tx)? {
                    if active != session.id {
                        return Err(IronLogError::ActiveSessionExists {
                            active_session_id: active.to_string(),
                        }
                        .into());
                    }
                }
            }

            tx.execute(
                "INSERT INTO workout_sessions
                    (id, template_id, template_name, started_at, ended_at, duration_seconds, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                    template_id = excluded.template_id,
                    template_name = excluded.template_name,
                    ended_at = excluded.ended_at,
                    duration_seconds = excluded.duration_seconds,
                    notes = excluded.notes",
                rusqlite::params![
                    id_text(session.id),
                    session.template_id.map(id_text),
                    session.template_name,
                    micros(session.started_at),
                    session.ended_at.map(micros),
                    session.duration_seconds,
                    session.notes,
                ],
            )
            .map_err(from_rusqlite)?;

            tracing::debug!(
                component = module_path!(),
                op = "save_session",
                session_id = %session.id,
            );
            Ok(())
        })
    }

    /// Upsert one exercise row; its sets are not touched
    ///
    /// An exercise stays with the session it was first saved under; naming a
    /// different session fails with `ConstraintViolation`.
    pub fn save_exercise(&self, exercise: &SessionExercise) -> Result<()> {
        validate_name("exercise name", &exercise.name)?;
        let session_id = id_text(exercise.session_id);
        self.db.transaction(|tx| {
            SESSION_EXERCISES.ensure_owner(tx, &id_text(exercise.id), &session_id)?;
            Self::CHILD_STRATEGY.write(
                tx,
                SESSION_EXERCISES,
                &session_id,
                std::slice::from_ref(exercise),
                upsert_exercise,
            )?;
            tracing::debug!(
                component = module_path!(),
                op = "save_exercise",
                session_id = %exercise.session_id,
                exercise_id = %exercise.id,
            );
            Ok(())
        })
    }

    /// Upsert one set after validating it against its exercise
    ///
    /// The owning exercise must exist; its `uses_weight` flag decides
    /// whether a weight is required or forbidden. A stored set cannot move to
    /// another exercise (`ConstraintViolation`).
    pub fn save_set(&self, set: &WorkoutSet) -> Result<()> {
        let exercise_id = id_text(set.session_exercise_id);
        self.db.transaction(|tx| {
            SETS.ensure_owner(tx, &id_text(set.id), &exercise_id)?;
            let uses_weight: bool = tx
                .query_row(
                    "SELECT uses_weight FROM session_exercises WHERE id = ?1",
                    [&exercise_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(from_rusqlite)?
                .ok_or_else(|| IronLogError::ExerciseNotFound {
                    exercise_id: exercise_id.clone(),
                })?;
            validate_set(set, uses_weight)?;

            Self::CHILD_STRATEGY.write(
                tx,
                SETS,
                &exercise_id,
                std::slice::from_ref(set),
                upsert_set,
            )?;
            tracing::debug!(
                component = module_path!(),
                op = "save_set",
                exercise_id = %set.session_exercise_id,
                set_id = %set.id,
            );
            Ok(())
        })
    }

    /// Delete one exercise; its sets cascade. Returns false if absent.
    pub fn delete_exercise(&self, id: Uuid) -> Result<bool> {
        self.delete_row("session_exercises", id)
    }

    /// Delete one set. Returns false if absent.
    pub fn delete_set(&self, id: Uuid) -> Result<bool> {
        self.delete_row("sets", id)
    }

    /// Delete a session; exercises and sets cascade. Returns false if absent.
    pub fn delete(&self, id: Uuid) -> Result<bool> {
        self.delete_row("workout_sessions", id)
    }

    /// Mark a session ended now with the given duration
    ///
    /// Children are not touched. Returns false if the session does not exist.
    pub fn end_session(&self, id: Uuid, duration_seconds: i64) -> Result<bool> {
        let updated = self.db.transaction(|tx| {
            tx.execute(
                "UPDATE workout_sessions SET ended_at = ?1, duration_seconds = ?2 WHERE id = ?3",
                rusqlite::params![micros(timestamp_now()), duration_seconds, id_text(id)],
            )
            .map_err(from_rusqlite)
        })?;
        tracing::debug!(
            component = module_path!(),
            op = "end_session",
            session_id = %id,
            row_count = updated as u64,
        );
        Ok(updated > 0)
    }

    fn delete_row(&self, table: &'static str, id: Uuid) -> Result<bool> {
        let removed = self.db.transaction(|tx| {
            tx.execute(&format!("DELETE FROM {} WHERE id = ?1", table), [id_text(id)])
                .map_err(from_rusqlite)
        })?;
        tracing::debug!(
            component = module_path!(),
            op = "delete_row",
            table = table,
            row_count = removed as u64,
        );
        Ok(removed > 0)
    }
}

fn active_session_id(conn: &Connection) -> Result<Option<Uuid>> {
    conn.query_row(
        "SELECT id FROM workout_sessions WHERE ended_at IS NULL
         ORDER BY started_at DESC, rowid DESC LIMIT 1",
        [],
        |row| get_uuid(row, 0),
    )
    .optional()
    .map_err(from_rusqlite)
}

fn upsert_exercise(conn: &Connection, exercise: &SessionExercise) -> Result<()> {
    conn.execute(
        "INSERT INTO session_exercises (id, session_id, name, order_index, uses_weight)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            order_index = excluded.order_index,
            uses_weight = excluded.uses_weight",
        rusqlite::params![
            id_text(exercise.id),
            id_text(exercise.session_id),
            exercise.name,
            exercise.order_index,
            exercise.uses_weight,
        ],
    )
    .map_err(from_rusqlite)?;
    Ok(())
}

fn upsert_set(conn: &Connection, set: &WorkoutSet) -> Result<()> {
    conn.execute(
        "INSERT INTO sets (id, session_exercise_id, reps, weight, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            reps = excluded.reps,
            weight = excluded.weight",
        rusqlite::params![
            id_text(set.id),
            id_text(set.session_exercise_id),
            set.reps,
            set.weight,
            micros(set.created_at),
        ],
    )
    .map_err(from_rusqlite)?;
    Ok(())
}

fn load_exercises(conn: &Connection, mut session: Session) -> Result<Session> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM session_exercises WHERE session_id = ?1 ORDER BY order_index, rowid",
            SESSION_EXERCISE_COLUMNS
        ))
        .map_err(from_rusqlite)?;
    let exercises = stmt
        .query_map([id_text(session.id)], session_exercise_from_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    session.exercises = exercises
        .into_iter()
        .map(|exercise| load_sets(conn, exercise))
        .collect::<Result<Vec<_>>>()?;
    Ok(session)
}

fn load_sets(conn: &Connection, mut exercise: SessionExercise) -> Result<SessionExercise> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM sets WHERE session_exercise_id = ?1 ORDER BY created_at, rowid",
            SET_COLUMNS
        ))
        .map_err(from_rusqlite)?;
    exercise.sets = stmt
        .query_map([id_text(exercise.id)], set_from_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(exercise)
}
