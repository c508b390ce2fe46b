//! Input validation applied before anything is written
//!
//! Repositories call these at their boundary so that stored data always
//! satisfies the model invariants, whatever the caller passed in.

use crate::errors::{IronLogError, Result};
use crate::model::WorkoutSet;

/// Reject names that are empty after trimming
pub fn validate_name(field: &'static str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(IronLogError::EmptyName { field }.into());
    }
    Ok(())
}

/// Check a set against the owning exercise's `uses_weight` flag
///
/// - reps must be positive
/// - bodyweight exercises take no weight
/// - weighted exercises need a finite, non-negative weight
pub fn validate_set(set: &WorkoutSet, uses_weight: bool) -> Result<()> {
    if set.reps <= 0 {
        return Err(IronLogError::InvalidReps { reps: set.reps }.into());
    }

    match (uses_weight, set.weight) {
        (false, Some(_)) => Err(IronLogError::WeightNotAllowed {
            exercise_id: set.session_exercise_id.to_string(),
        }
        .into()),
        (true, None) => Err(IronLogError::WeightRequired {
            exercise_id: set.session_exercise_id.to_string(),
        }
        .into()),
        (true, Some(weight)) if !weight.is_finite() || weight < 0.0 => {
            Err(IronLogError::InvalidWeight { weight }.into())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use uuid::Uuid;

    #[test]
    fn test_valid_sets() {
        let exercise_id = Uuid::new_v4();
        assert!(validate_set(&WorkoutSet::new(exercise_id, 10, Some(135.0)), true).is_ok());
        assert!(validate_set(&WorkoutSet::new(exercise_id, 12, None), false).is_ok());
        assert!(validate_set(&WorkoutSet::new(exercise_id, 1, Some(0.0)), true).is_ok());
    }

    #[test]
    fn test_non_positive_reps_rejected() {
        let exercise_id = Uuid::new_v4();
        for reps in [0, -3] {
            let err = validate_set(&WorkoutSet::new(exercise_id, reps, Some(100.0)), true)
                .unwrap_err();
            assert_eq!(err.kind(), ExErrorKind::InvalidInput);
        }
    }

    #[test]
    fn test_weight_presence_must_match_exercise() {
        let exercise_id = Uuid::new_v4();
        let err = validate_set(&WorkoutSet::new(exercise_id, 10, Some(20.0)), false).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
        assert_eq!(err.entity_id(), Some(exercise_id.to_string().as_str()));

        let err = validate_set(&WorkoutSet::new(exercise_id, 10, None), true).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_bad_weights_rejected() {
        let exercise_id = Uuid::new_v4();
        for weight in [-5.0, f64::NAN, f64::INFINITY] {
            assert!(validate_set(&WorkoutSet::new(exercise_id, 5, Some(weight)), true).is_err());
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("template name", "Push Day").is_ok());
        let err = validate_name("template name", "   ").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
        assert!(err.message().contains("template name"));
    }
}
