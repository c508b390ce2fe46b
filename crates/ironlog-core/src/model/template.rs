use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp_now;
use crate::ops::reindex::{reindex, Ordered};

/// Template - a reusable, named list of exercises
///
/// A Template owns its exercises. They are persisted with the
/// replace-all-children strategy, so the in-memory list is the sole source of
/// truth at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier (UUID v4), assigned at construction
    pub id: Uuid,

    /// Display name; mutable
    pub name: String,

    /// Timestamp when this Template was created
    pub created_at: DateTime<Utc>,

    /// Exercises in `order_index` order
    pub exercises: Vec<TemplateExercise>,
}

impl Template {
    /// Create a new, empty Template with a fresh id and creation time
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: timestamp_now(),
            exercises: Vec::new(),
        }
    }

    /// Append an exercise at the end of the list and return its id
    pub fn add_exercise(&mut self, name: impl Into<String>, uses_weight: bool) -> Uuid {
        let order_index = self.exercises.len() as u32;
        let exercise = TemplateExercise::new(self.id, name, order_index, uses_weight);
        let id = exercise.id;
        self.exercises.push(exercise);
        id
    }

    /// Remove an exercise and close the gap in `order_index`
    ///
    /// Returns false if no exercise had the given id.
    pub fn remove_exercise(&mut self, exercise_id: Uuid) -> bool {
        let before = self.exercises.len();
        let remaining: Vec<TemplateExercise> = self
            .exercises
            .iter()
            .filter(|e| e.id != exercise_id)
            .cloned()
            .collect();
        let removed = remaining.len() != before;
        self.exercises = reindex(remaining);
        removed
    }

    /// Number of exercises in this Template
    pub fn exercise_count(&self) -> usize {
        self.exercises.len()
    }

    /// Copy this Template under a new id and name
    ///
    /// Every exercise gets a new id; names, `order_index` and `uses_weight`
    /// are preserved.
    pub fn duplicate(&self, new_name: impl Into<String>) -> Self {
        let mut copy = Template::new(new_name);
        let template_id = copy.id;
        copy.exercises = self
            .exercises
            .iter()
            .map(|ex| {
                TemplateExercise::new(template_id, ex.name.clone(), ex.order_index, ex.uses_weight)
            })
            .collect();
        copy
    }
}

/// One exercise slot within a Template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateExercise {
    pub id: Uuid,

    /// Back-reference to the owning Template
    pub template_id: Uuid,

    pub name: String,

    /// 0-based position, unique and contiguous within the template
    pub order_index: u32,

    /// False for bodyweight exercises
    pub uses_weight: bool,
}

impl TemplateExercise {
    pub fn new(
        template_id: Uuid,
        name: impl Into<String>,
        order_index: u32,
        uses_weight: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            template_id,
            name: name.into(),
            order_index,
            uses_weight,
        }
    }
}

impl Ordered for TemplateExercise {
    fn order_index(&self) -> u32 {
        self.order_index
    }

    fn with_order_index(self, order_index: u32) -> Self {
        Self {
            order_index,
            ..self
        }
    }
}
