// Integration tests for the template repository
// Covers: round trip, replace-all-children save, cascade delete, duplicate

use ironlog_core::{ExErrorKind, Session, Template};
use ironlog_store::errors::from_rusqlite;
use ironlog_store::{
    apply_migrations, ChildStrategy, SessionRepository, StorageHandle, TemplateRepository,
};
use uuid::Uuid;

fn setup_test_db() -> StorageHandle {
    let handle = StorageHandle::open_in_memory().expect("Failed to create in-memory database");
    apply_migrations(&handle).expect("Migrations should succeed");
    handle
}

fn count_rows(handle: &StorageHandle, sql: &str, id: Uuid) -> i64 {
    handle
        .cursor(|conn| {
            conn.query_row(sql, [id.to_string()], |row| row.get(0))
                .map_err(from_rusqlite)
        })
        .unwrap()
}

fn upper_body() -> Template {
    let mut template = Template::new("Upper Body");
    template.add_exercise("Bench Press", true);
    template.add_exercise("Chin-ups", false);
    template.add_exercise("Overhead Press", true);
    template
}

#[test]
fn test_strategy_is_replace_all_children() {
    assert_eq!(
        TemplateRepository::CHILD_STRATEGY,
        ChildStrategy::ReplaceAllChildren
    );
}

#[test]
fn test_save_and_get_round_trip() {
    // Given: A template with three exercises
    let handle = setup_test_db();
    let repo = TemplateRepository::new(&handle);
    let template = upper_body();

    // When: It is saved and reloaded
    repo.save(&template).unwrap();
    let loaded = repo.get_by_id(template.id).unwrap().expect("template exists");

    // Then: Every field and child is reproduced in order
    assert_eq!(loaded, template);
}

#[test]
fn test_get_missing_template_is_none() {
    let handle = setup_test_db();
    let repo = TemplateRepository::new(&handle);
    assert!(repo.get_by_id(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn test_list_orders_by_name() {
    let handle = setup_test_db();
    let repo = TemplateRepository::new(&handle);
    repo.save(&Template::new("Arms")).unwrap();
    repo.save(&Template::new("Zone 2")).unwrap();

    let names: Vec<String> = repo.list().unwrap().into_iter().map(|t| t.name).collect();
    assert_eq!(
        names,
        vec!["Arms", "Leg Day", "Pull Day", "Push Day", "Zone 2"]
    );
}

#[test]
fn test_save_replaces_dropped_exercise() {
    // Given: A persisted template
    let handle = setup_test_db();
    let repo = TemplateRepository::new(&handle);
    let mut template = upper_body();
    repo.save(&template).unwrap();
    let dropped = template.exercises[1].id;

    // When: One exercise is removed in memory and the template is saved
    assert!(template.remove_exercise(dropped));
    template.name = "Upper Body A".to_string();
    repo.save(&template).unwrap();

    // Then: The dropped exercise is gone and the rest keep their ids
    let loaded = repo.get_by_id(template.id).unwrap().unwrap();
    assert_eq!(loaded.name, "Upper Body A");
    assert_eq!(loaded.exercises, template.exercises);
    assert!(loaded.exercises.iter().all(|e| e.id != dropped));
    assert_eq!(
        count_rows(
            &handle,
            "SELECT COUNT(*) FROM template_exercises WHERE id = ?1",
            dropped
        ),
        0
    );
}

#[test]
fn test_save_cannot_take_exercise_from_another_template() {
    // Given: Template A with two persisted exercises
    let handle = setup_test_db();
    let repo = TemplateRepository::new(&handle);
    let mut legs = Template::new("Legs A");
    legs.add_exercise("Squats", true);
    legs.add_exercise("Lunges", true);
    repo.save(&legs).unwrap();

    // When: Template B is saved carrying A's first exercise row
    let mut other = Template::new("Legs B");
    let mut borrowed = legs.exercises[0].clone();
    borrowed.template_id = other.id;
    other.exercises.push(borrowed);
    let err = repo.save(&other).unwrap_err();

    // Then: The save fails and neither template changed
    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
    assert!(repo.get_by_id(other.id).unwrap().is_none());
    let loaded = repo.get_by_id(legs.id).unwrap().unwrap();
    assert_eq!(loaded.exercises, legs.exercises);
    let indexes: Vec<u32> = loaded.exercises.iter().map(|e| e.order_index).collect();
    assert_eq!(indexes, vec![0, 1]);
}

#[test]
fn test_save_renumbers_order_index() {
    let handle = setup_test_db();
    let repo = TemplateRepository::new(&handle);
    let mut template = upper_body();
    template.exercises[0].order_index = 10;
    template.exercises[2].order_index = 4;

    repo.save(&template).unwrap();

    let loaded = repo.get_by_id(template.id).unwrap().unwrap();
    let indexes: Vec<u32> = loaded.exercises.iter().map(|e| e.order_index).collect();
    assert_eq!(indexes, vec![0, 1, 2]);
    assert_eq!(loaded.exercises[0].name, "Bench Press");
}

#[test]
fn test_save_rejects_blank_names() {
    let handle = setup_test_db();
    let repo = TemplateRepository::new(&handle);

    let err = repo.save(&Template::new("  ")).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);

    let mut template = Template::new("Core");
    template.add_exercise("", false);
    let err = repo.save(&template).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert!(repo.get_by_id(template.id).unwrap().is_none());
}

#[test]
fn test_delete_cascades_to_exercises() {
    // Given: A persisted template
    let handle = setup_test_db();
    let repo = TemplateRepository::new(&handle);
    let template = upper_body();
    repo.save(&template).unwrap();

    // When: It is deleted
    assert!(repo.delete(template.id).unwrap());

    // Then: The template and all of its exercises are gone
    assert!(repo.get_by_id(template.id).unwrap().is_none());
    assert_eq!(
        count_rows(
            &handle,
            "SELECT COUNT(*) FROM template_exercises WHERE template_id = ?1",
            template.id
        ),
        0
    );
    assert!(!repo.delete(template.id).unwrap());
}

#[test]
fn test_delete_keeps_session_snapshot() {
    // Given: A session started from a template
    let handle = setup_test_db();
    let templates = TemplateRepository::new(&handle);
    let sessions = SessionRepository::new(&handle);
    let template = upper_body();
    templates.save(&template).unwrap();
    let session = Session::from_template(&template);
    sessions.save(&session).unwrap();

    // When: The template is deleted
    templates.delete(template.id).unwrap();

    // Then: The session keeps the template name but loses the link
    let loaded = sessions.get_by_id(session.id).unwrap().unwrap();
    assert_eq!(loaded.template_id, None);
    assert_eq!(loaded.template_name.as_deref(), Some("Upper Body"));
}

#[test]
fn test_duplicate() {
    let handle = setup_test_db();
    let repo = TemplateRepository::new(&handle);
    let template = upper_body();
    repo.save(&template).unwrap();

    let copy = repo
        .duplicate(template.id, "Upper Body (copy)")
        .unwrap()
        .expect("source exists");

    assert_ne!(copy.id, template.id);
    let loaded = repo.get_by_id(copy.id).unwrap().unwrap();
    assert_eq!(loaded, copy);
    assert_eq!(loaded.name, "Upper Body (copy)");
    for (orig, dup) in template.exercises.iter().zip(&loaded.exercises) {
        assert_ne!(orig.id, dup.id);
        assert_eq!(orig.name, dup.name);
        assert_eq!(orig.order_index, dup.order_index);
        assert_eq!(orig.uses_weight, dup.uses_weight);
    }

    // The source is untouched
    assert_eq!(repo.get_by_id(template.id).unwrap().unwrap(), template);
}

#[test]
fn test_duplicate_missing_is_none() {
    let handle = setup_test_db();
    let repo = TemplateRepository::new(&handle);
    assert!(repo.duplicate(Uuid::new_v4(), "Copy").unwrap().is_none());
}
