//! Child persistence strategies
//!
//! Each aggregate repository declares one of these as its
//! `CHILD_STRATEGY` and routes every child write through [`ChildStrategy::write`].

use ironlog_core::IronLogError;
use rusqlite::{Connection, OptionalExtension};

use crate::errors::{from_rusqlite, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStrategy {
    /// Delete every existing child of the parent, then insert the given list.
    /// The in-memory list is the sole source of truth at save time.
    ReplaceAllChildren,

    /// Insert-or-update each given child by id; other children are untouched.
    UpsertChild,
}

/// A child table and the column referencing its parent
#[derive(Debug, Clone, Copy)]
pub struct ChildTable {
    pub name: &'static str,
    pub parent_column: &'static str,
}

impl ChildTable {
    /// Fail if `child_id` is already stored under a parent other than `parent_id`
    ///
    /// Upserts never move a child between parents, so an id collision across
    /// aggregates is rejected with `ConstraintViolation` before anything is
    /// written.
    pub fn ensure_owner(&self, conn: &Connection, child_id: &str, parent_id: &str) -> Result<()> {
        let stored: Option<String> = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE id = ?1",
                    self.parent_column, self.name
                ),
                [child_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;

        match stored {
            Some(owner) if owner != parent_id => Err(IronLogError::ChildOwnerMismatch {
                child_id: child_id.to_string(),
                owner_id: owner,
                requested_owner_id: parent_id.to_string(),
            }
            .into()),
            _ => Ok(()),
        }
    }
}

pub const TEMPLATE_EXERCISES: ChildTable = ChildTable {
    name: "template_exercises",
    parent_column: "template_id",
};

pub const SESSION_EXERCISES: ChildTable = ChildTable {
    name: "session_exercises",
    parent_column: "session_id",
};

pub const SETS: ChildTable = ChildTable {
    name: "sets",
    parent_column: "session_exercise_id",
};

impl ChildStrategy {
    /// Write `children` of `parent_id` with this strategy
    ///
    /// `upsert` persists one child row. Returns the number of children written.
    pub fn write<C, F>(
        self,
        conn: &Connection,
        table: ChildTable,
        parent_id: &str,
        children: &[C],
        mut upsert: F,
    ) -> Result<usize>
    where
        F: FnMut(&Connection, &C) -> Result<()>,
    {
        if self == ChildStrategy::ReplaceAllChildren {
            let removed = conn
                .execute(
                    &format!(
                        "DELETE FROM {} WHERE {} = ?1",
                        table.name, table.parent_column
                    ),
                    [parent_id],
                )
                .map_err(from_rusqlite)?;
            tracing::debug!(
                component = module_path!(),
                op = "replace_children",
                table = table.name,
                row_count = removed as u64,
            );
        }

        for child in children {
            upsert(conn, child)?;
        }
        Ok(children.len())
    }
}
