use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::template::{Template, TemplateExercise};
use super::timestamp_now;
use crate::ops::format::format_duration;
use crate::ops::reindex::Ordered;

/// Session - one workout, active or completed
///
/// The template linkage is a denormalized snapshot taken when the session
/// starts; it survives deletion or renaming of the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub template_id: Option<Uuid>,
    pub template_name: Option<String>,
    pub started_at: DateTime<Utc>,

    /// Unset while the session is active
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub notes: Option<String>,

    /// Exercises in `order_index` order
    pub exercises: Vec<SessionExercise>,
}

impl Session {
    /// Start a new session with no template
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            template_id: None,
            template_name: None,
            started_at: timestamp_now(),
            ended_at: None,
            duration_seconds: None,
            notes: None,
            exercises: Vec::new(),
        }
    }

    /// Start a new session pre-filled with a template's exercises
    pub fn from_template(template: &Template) -> Self {
        let mut session = Self::new();
        session.template_id = Some(template.id);
        session.template_name = Some(template.name.clone());
        let session_id = session.id;
        session.exercises = template
            .exercises
            .iter()
            .map(|tex| SessionExercise::from_template_exercise(session_id, tex))
            .collect();
        session
    }

    /// A session is active until it has an end time
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Look up one of this session's exercises
    pub fn exercise(&self, exercise_id: Uuid) -> Option<&SessionExercise> {
        self.exercises.iter().find(|e| e.id == exercise_id)
    }

    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    pub fn total_reps(&self) -> i64 {
        self.exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .map(|s| s.reps)
            .sum()
    }

    /// Sum of weight × reps over weighted sets
    pub fn total_volume(&self) -> f64 {
        self.exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .filter_map(|s| s.weight.map(|w| w * s.reps as f64))
            .sum()
    }

    /// Duration as "H:MM:SS"/"M:SS", or "--:--" while unknown
    pub fn formatted_duration(&self) -> String {
        match self.duration_seconds {
            Some(seconds) => format_duration(seconds),
            None => "--:--".to_string(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// An exercise performed within a Session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExercise {
    pub id: Uuid,
    pub session_id: Uuid,
    pub name: String,
    pub order_index: u32,
    pub uses_weight: bool,

    /// Sets in creation order
    pub sets: Vec<WorkoutSet>,
}

impl SessionExercise {
    pub fn new(
        session_id: Uuid,
        name: impl Into<String>,
        order_index: u32,
        uses_weight: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            name: name.into(),
            order_index,
            uses_weight,
            sets: Vec::new(),
        }
    }

    /// Copy a template slot into a session under a fresh id
    pub fn from_template_exercise(session_id: Uuid, template_exercise: &TemplateExercise) -> Self {
        Self::new(
            session_id,
            template_exercise.name.clone(),
            template_exercise.order_index,
            template_exercise.uses_weight,
        )
    }
}

impl Ordered for SessionExercise {
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

/// A single set: reps, plus weight for weighted exercises
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub id: Uuid,
    pub session_exercise_id: Uuid,
    pub reps: i64,

    /// None encodes bodyweight
    pub weight: Option<f64>,

    /// Assigned at creation; the set's ordering key
    pub created_at: DateTime<Utc>,
}

impl WorkoutSet {
    pub fn new(session_exercise_id: Uuid, reps: i64, weight: Option<f64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_exercise_id,
            reps,
            weight,
            created_at: timestamp_now(),
        }
    }
}
