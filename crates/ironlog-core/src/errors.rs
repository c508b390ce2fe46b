use thiserror::Error;

/// Result type alias using the canonical structured error
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// raised by the IronLog core. Each kind maps to a stable error code that can
/// be used for programmatic error handling and test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    NotFound,
    ConstraintViolation,

    // Startup
    MigrationFailed,
    Config,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::MigrationFailed => "ERR_MIGRATION_FAILED",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus operation and
/// entity context for debugging. Storage failures keep the underlying cause as
/// the message so callers observe it unchanged after a rollback.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// True when the error is a missing-entity error
    pub fn is_not_found(&self) -> bool {
        self.kind == ExErrorKind::NotFound
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for IronLog operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IronLogError {
    #[error("Template not found: {template_id}")]
    TemplateNotFound { template_id: String },

    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("Session exercise not found: {exercise_id}")]
    ExerciseNotFound { exercise_id: String },

    /// A second session may not become active while another one is
    #[error("Session {active_session_id} is already active")]
    ActiveSessionExists { active_session_id: String },

    #[error("Session {session_id} has already ended")]
    SessionAlreadyEnded { session_id: String },

    /// A stored child row may not be re-saved under a different parent
    #[error("{child_id} belongs to {owner_id}, not {requested_owner_id}")]
    ChildOwnerMismatch {
        child_id: String,
        owner_id: String,
        requested_owner_id: String,
    },

    #[error("Reps must be positive, got {reps}")]
    InvalidReps { reps: i64 },

    /// Weight supplied for an exercise that does not use weight
    #[error("Exercise {exercise_id} is bodyweight; weight is not allowed")]
    WeightNotAllowed { exercise_id: String },

    /// Weight missing for an exercise that uses weight
    #[error("Exercise {exercise_id} uses weight; a weight is required")]
    WeightRequired { exercise_id: String },

    #[error("Weight must be a finite, non-negative number, got {weight}")]
    InvalidWeight { weight: f64 },

    #[error("{field} must not be empty")]
    EmptyName { field: &'static str },
}

impl From<IronLogError> for ExError {
    fn from(err: IronLogError) -> Self {
        let message = err.to_string();
        match err {
            IronLogError::TemplateNotFound { template_id } => {
                ExError::new(ExErrorKind::NotFound).with_entity_id(template_id)
            }
            IronLogError::SessionNotFound { session_id } => {
                ExError::new(ExErrorKind::NotFound).with_entity_id(session_id)
            }
            IronLogError::ExerciseNotFound { exercise_id } => {
                ExError::new(ExErrorKind::NotFound).with_entity_id(exercise_id)
            }
            IronLogError::ActiveSessionExists { active_session_id } => {
                ExError::new(ExErrorKind::ConstraintViolation).with_entity_id(active_session_id)
            }
            IronLogError::SessionAlreadyEnded { session_id } => {
                ExError::new(ExErrorKind::ConstraintViolation).with_entity_id(session_id)
            }
            IronLogError::ChildOwnerMismatch { child_id, .. } => {
                ExError::new(ExErrorKind::ConstraintViolation).with_entity_id(child_id)
            }
            IronLogError::WeightNotAllowed { exercise_id }
            | IronLogError::WeightRequired { exercise_id } => {
                ExError::new(ExErrorKind::InvalidInput).with_entity_id(exercise_id)
            }
            IronLogError::InvalidReps { .. }
            | IronLogError::InvalidWeight { .. }
            | IronLogError::EmptyName { .. } => ExError::new(ExErrorKind::InvalidInput),
        }
        .with_message(message)
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}
