// Integration tests for the exercise history index

use ironlog_core::{Session, SessionExercise, WorkoutSet};
use ironlog_store::{apply_migrations, ExerciseHistoryIndex, SessionRepository, StorageHandle};

fn setup_test_db() -> StorageHandle {
    let handle = StorageHandle::open_in_memory().expect("Failed to create in-memory database");
    apply_migrations(&handle).expect("Migrations should succeed");
    handle
}

/// Save a finished session holding one exercise with the given sets
fn log_session(
    handle: &StorageHandle,
    name: &str,
    uses_weight: bool,
    sets: &[(i64, Option<f64>)],
) {
    let repo = SessionRepository::new(handle);
    let mut session = Session::new();
    repo.save(&session).unwrap();
    let exercise = SessionExercise::new(session.id, name, 0, uses_weight);
    repo.save_exercise(&exercise).unwrap();
    for (reps, weight) in sets {
        repo.save_set(&WorkoutSet::new(exercise.id, *reps, *weight))
            .unwrap();
    }
    session.ended_at = Some(ironlog_core::model::timestamp_now());
    repo.save(&session).unwrap();
}

#[test]
fn test_last_weight_is_most_recent_set() {
    // Given: Squats sets at 135, 155, 175 in that order
    let handle = setup_test_db();
    log_session(
        &handle,
        "Squats",
        true,
        &[(5, Some(135.0)), (5, Some(155.0)), (5, Some(175.0))],
    );

    // When/Then: The last weight is 175
    let index = ExerciseHistoryIndex::new(&handle);
    assert_eq!(
        index.last_weight_for_exercise_name("Squats").unwrap(),
        Some(175.0)
    );
}

#[test]
fn test_last_weight_spans_sessions() {
    let handle = setup_test_db();
    log_session(&handle, "Bench Press", true, &[(8, Some(185.0))]);
    log_session(&handle, "Bench Press", true, &[(8, Some(190.0))]);
    log_session(&handle, "Squats", true, &[(5, Some(300.0))]);

    let index = ExerciseHistoryIndex::new(&handle);
    assert_eq!(
        index.last_weight_for_exercise_name("Bench Press").unwrap(),
        Some(190.0)
    );
}

#[test]
fn test_name_match_is_exact() {
    let handle = setup_test_db();
    log_session(&handle, "Squats", true, &[(5, Some(225.0))]);

    let index = ExerciseHistoryIndex::new(&handle);
    assert_eq!(index.last_weight_for_exercise_name("Squat").unwrap(), None);
    assert_eq!(index.last_weight_for_exercise_name("squats").unwrap(), None);
}

#[test]
fn test_bodyweight_sets_are_skipped() {
    let handle = setup_test_db();
    log_session(&handle, "Pull-ups", false, &[(10, None), (8, None)]);

    let index = ExerciseHistoryIndex::new(&handle);
    assert_eq!(index.last_weight_for_exercise_name("Pull-ups").unwrap(), None);
    assert_eq!(index.last_weight_for_exercise_name("Never Done").unwrap(), None);
}
