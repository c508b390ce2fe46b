//! Repository layer for persisting the IronLog aggregates to SQLite
//!
//! Templates and sessions are loaded and saved as whole trees; see
//! [`ChildStrategy`] for how each writes its children.

pub mod history;
pub mod rows;
pub mod session_repo;
pub mod strategy;
pub mod template_repo;

pub use history::ExerciseHistoryIndex;
pub use session_repo::SessionRepository;
pub use strategy::{ChildStrategy, ChildTable};
pub use template_repo::TemplateRepository;
