//! Default template seed
//!
//! Runs only while the templates table is empty, so re-execution after an
//! interrupted ledger append inserts nothing.

use ironlog_core::Template;
use rusqlite::Connection;

use crate::errors::{from_rusqlite, Result};
use crate::repo::template_repo::write_template;

/// (template name, [(exercise name, uses_weight)])
type SeedTemplate = (&'static str, &'static [(&'static str, bool)]);

const DEFAULT_TEMPLATES: [SeedTemplate; 3] = [
    (
        "Push Day",
        &[
            ("Bench Press", true),
            ("Overhead Press", true),
            ("Incline Dumbbell Press", true),
            ("Tricep Pushdowns", true),
            ("Lateral Raises", true),
        ],
    ),
    (
        "Pull Day",
        &[
            ("Deadlift", true),
            ("Barbell Rows", true),
            ("Pull-ups", false),
            ("Face Pulls", true),
            ("Bicep Curls", true),
        ],
    ),
    (
        "Leg Day",
        &[
            ("Squats", true),
            ("Romanian Deadlifts", true),
            ("Leg Press", true),
            ("Leg Curls", true),
            ("Calf Raises", true),
        ],
    ),
];

pub(crate) fn seed_templates(conn: &Connection) -> Result<()> {
    let existing: i64 = conn
        .query_row("SELECT COUNT(*) FROM workout_templates", [], |row| row.get(0))
        .map_err(from_rusqlite)?;
    if existing > 0 {
        tracing::debug!(
            component = module_path!(),
            op = "seed_templates",
            row_count = existing,
            "templates present; seed skipped"
        );
        return Ok(());
    }

    for (name, exercises) in DEFAULT_TEMPLATES {
        let mut template = Template::new(name);
        for (exercise, uses_weight) in exercises {
            template.add_exercise(*exercise, *uses_weight);
        }
        write_template(conn, &template)?;
    }
    Ok(())
}
