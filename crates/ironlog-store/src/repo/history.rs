//! Cross-session exercise history

use rusqlite::OptionalExtension;

use crate::db::StorageHandle;
use crate::errors::{from_rusqlite, Result};

pub struct ExerciseHistoryIndex<'a> {
    db: &'a StorageHandle,
}

impl<'a> ExerciseHistoryIndex<'a> {
    pub fn new(db: &'a StorageHandle) -> Self {
        Self { db }
    }

    /// Most recent recorded weight for exercises named exactly `name`
    ///
    /// Looks across every session, newest set first; bodyweight sets are
    /// skipped. Matching is exact, so "Squat" and "Squats" are unrelated.
    pub fn last_weight_for_exercise_name(&self, name: &str) -> Result<Option<f64>> {
        self.db.cursor(|conn| {
            conn.query_row(
                "SELECT s.weight
                 FROM sets s
                 JOIN session_exercises e ON s.session_exercise_id = e.id
                 WHERE e.name = ?1 AND s.weight IS NOT NULL
                 ORDER BY s.created_at DESC, s.rowid DESC
                 LIMIT 1",
                [name],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)
        })
    }
}
