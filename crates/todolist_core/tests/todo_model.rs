use todolist_core::{Filter, Todo, TodoValidationError};

#[test]
fn serialization_uses_store_wire_fields() {
    let todo = Todo::with_state(1_700_000_000_000, "Buy milk", true).unwrap();

    let json = serde_json::to_value(&todo).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"id": 1_700_000_000_000_i64, "title": "Buy milk", "completed": true})
    );

    let decoded: Todo = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, todo);
}

#[test]
fn deserialize_trims_title() {
    let decoded: Todo =
        serde_json::from_value(serde_json::json!({"id": 3, "title": "  padded ", "completed": false}))
            .unwrap();
    assert_eq!(decoded.title(), "padded");
}

#[test]
fn deserialize_rejects_blank_title() {
    let err = serde_json::from_value::<Todo>(
        serde_json::json!({"id": 3, "title": " ", "completed": false}),
    )
    .unwrap_err();
    assert!(
        err.to_string().contains("title must not be empty"),
        "unexpected error: {err}"
    );
}

#[test]
fn constructors_share_validation() {
    assert_eq!(Todo::new(1, "").unwrap_err(), TodoValidationError::EmptyTitle);
    assert_eq!(
        Todo::with_state(1, "\n", true).unwrap_err(),
        TodoValidationError::EmptyTitle
    );
}

#[test]
fn filter_shows_expected_completion_states() {
    assert!(Filter::All.shows(true) && Filter::All.shows(false));
    assert!(Filter::ActiveOnly.shows(false) && !Filter::ActiveOnly.shows(true));
    assert!(Filter::CompletedOnly.shows(true) && !Filter::CompletedOnly.shows(false));
}
