//! Template repository
//!
//! Templates persist with [`ChildStrategy::ReplaceAllChildren`]: a save
//! deletes every stored exercise of the template and re-inserts the
//! in-memory list. Exercise ids are kept from memory, so identity survives
//! only as long as callers do not regenerate them between saves.

use ironlog_core::ops::reindex;
use ironlog_core::rules::validate_name;
use ironlog_core::{Template, TemplateExercise};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::StorageHandle;
use crate::errors::{from_rusqlite, Result};
use crate::repo::rows::{
    id_text, micros, template_exercise_from_row, template_from_row, TEMPLATE_COLUMNS,
    TEMPLATE_EXERCISE_COLUMNS,
};
use crate::repo::strategy::{ChildStrategy, TEMPLATE_EXERCISES};

pub struct TemplateRepository<'a> {
    db: &'a StorageHandle,
}

impl<'a> TemplateRepository<'a> {
    pub const CHILD_STRATEGY: ChildStrategy = ChildStrategy::ReplaceAllChildren;

    pub fn new(db: &'a StorageHandle) -> Self {
        Self { db }
    }

    /// All templates ordered by name, each with its exercises
    pub fn list(&self) -> Result<Vec<Template>> {
        self.db.cursor(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM workout_templates ORDER BY name, rowid",
                    TEMPLATE_COLUMNS
                ))
                .map_err(from_rusqlite)?;
            let parents = stmt
                .query_map([], template_from_row)
                .map_err(from_rusqlite)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(from_rusqlite)?;

            parents
                .into_iter()
                .map(|template| load_exercises(conn, template))
                .collect()
        })
    }

    /// One template with its exercises, or `None`
    pub fn get_by_id(&self, id: Uuid) -> Result<Option<Template>> {
        self.db.cursor(|conn| load_template(conn, id))
    }

    /// Upsert the template and replace all of its exercises
    ///
    /// Names are validated and `order_index` is renumbered from 0 in list
    /// order before anything is written.
    pub fn save(&self, template: &Template) -> Result<()> {
        validate_name("template name", &template.name)?;
        for exercise in &template.exercises {
            validate_name("exercise name", &exercise.name)?;
        }

        self.db.transaction(|tx| write_template(tx, template))
    }

    /// Delete a template; its exercises cascade. Returns false if absent.
    pub fn delete(&self, id: Uuid) -> Result<bool> {
        let removed = self.db.transaction(|tx| {
            tx.execute(
                "DELETE FROM workout_templates WHERE id = ?1",
                [id_text(id)],
            )
            .map_err(from_rusqlite)
        })?;
        tracing::debug!(
            component = module_path!(),
            op = "delete_template",
            template_id = %id,
            row_count = removed as u64,
        );
        Ok(removed > 0)
    }

    /// Copy a stored template under a new id and name
    ///
    /// Returns `None` when the source does not exist.
    pub fn duplicate(&self, id: Uuid, new_name: &str) -> Result<Option<Template>> {
        validate_name("template name", new_name)?;
        self.db.transaction(|tx| {
            let Some(source) = load_template(tx, id)? else {
                return Ok(None);
            };
            let copy = source.duplicate(new_name);
            write_template(tx, &copy)?;
            Ok(Some(copy))
        })
    }
}

/// Upsert the parent row, then replace its children
///
/// The template's own children are deleted first, so an exercise id that
/// still collides belongs to another template and fails the insert with
/// `ConstraintViolation`.
pub(crate) fn write_template(conn: &Connection, template: &Template) -> Result<()> {
    let template_id = id_text(template.id);
    conn.execute(
        "INSERT INTO workout_templates (id, name, created_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        rusqlite::params![template_id, template.name, micros(template.created_at)],
    )
    .map_err(from_rusqlite)?;

    let exercises = reindex(template.exercises.iter().cloned());
    let written = TemplateRepository::CHILD_STRATEGY.write(
        conn,
        TEMPLATE_EXERCISES,
        &template_id,
        &exercises,
        |conn, exercise| insert_exercise(conn, &template_id, exercise),
    )?;

    tracing::debug!(
        component = module_path!(),
        op = "save_template",
        template_id = %template.id,
        child_count = written as u64,
    );
    Ok(())
}

fn insert_exercise(
    conn: &Connection,
    template_id: &str,
    exercise: &TemplateExercise,
) -> Result<()> {
    conn.execute(
        "INSERT INTO template_exercises (id, template_id, name, order_index, uses_weight)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            id_text(exercise.id),
            template_id,
            exercise.name,
            exercise.order_index,
            exercise.uses_weight,
        ],
    )
    .map_err(from_rusqlite)?;
    Ok(())
}

fn load_template(conn: &Connection, id: Uuid) -> Result<Option<Template>> {
    let parent = conn
        .query_row(
            &format!(
                "SELECT {} FROM workout_templates WHERE id = ?1",
                TEMPLATE_COLUMNS
            ),
            [id_text(id)],
            template_from_row,
        )
        .optional()
        .map_err(from_rusqlite)?;

    parent.map(|template| load_exercises(conn, template)).transpose()
}

fn load_exercises(conn: &Connection, mut template: Template) -> Result<Template> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM template_exercises WHERE template_id = ?1 ORDER BY order_index, rowid",
            TEMPLATE_EXERCISE_COLUMNS
        ))
        .map_err(from_rusqlite)?;
    template.exercises = stmt
        .query_map([id_text(template.id)], template_exercise_from_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(template)
}
