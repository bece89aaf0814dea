use todotab_core::db::open_db_in_memory;
use todotab_core::{
    Category, DeletePrompt, KeyValueStore, KvToDoRepository, LoadStatus, RemoveOutcome,
    SqliteKeyValueStore, SqliteToDoStore, StoreError, ToDoId, ToDoStore, DELETE_PROMPT,
};

fn loaded_store() -> SqliteToDoStore {
    let conn = open_db_in_memory().unwrap();
    let mut store = ToDoStore::new(KvToDoRepository::new(SqliteKeyValueStore::new(conn)));
    store.load().unwrap();
    store
}

fn persisted_blob(store: &SqliteToDoStore) -> serde_json::Value {
    let raw = store
        .repository()
        .store()
        .get_item("@toDos")
        .unwrap()
        .expect("collection should be persisted");
    serde_json::from_str(&raw).unwrap()
}

fn accept(_: &DeletePrompt) -> bool {
    true
}

#[test]
fn load_without_prior_data_defaults_to_empty_work_list() {
    let conn = open_db_in_memory().unwrap();
    let mut store = ToDoStore::new(KvToDoRepository::new(SqliteKeyValueStore::new(conn)));

    let report = store.load().unwrap();
    assert_eq!(report.todos, LoadStatus::Absent);
    assert_eq!(report.active_category, LoadStatus::Absent);
    assert!(store.is_empty());
    assert_eq!(store.active_category(), Category::Work);
}

#[test]
fn add_then_toggle_is_reflected_in_persisted_blob() {
    let mut store = loaded_store();

    let id = store.add("Buy milk", Category::Work).unwrap().unwrap();
    assert_eq!(store.len(), 1);
    let record = store.get(&id).unwrap();
    assert_eq!(record.text, "Buy milk");
    assert_eq!(record.category, Category::Work);
    assert!(!record.complete);

    assert!(store.toggle_complete(&id).unwrap());
    let blob = persisted_blob(&store);
    assert_eq!(blob[id.as_str()]["complete"], serde_json::json!(true));
    assert_eq!(blob[id.as_str()]["category"], serde_json::json!("work"));
}

#[test]
fn toggling_twice_restores_original_state() {
    let mut store = loaded_store();
    let id = store.add("Pack charger", Category::Travel).unwrap().unwrap();
    let before = store.get(&id).unwrap().clone();

    store.toggle_complete(&id).unwrap();
    store.toggle_complete(&id).unwrap();

    assert_eq!(store.get(&id).unwrap(), &before);
}

#[test]
fn blank_text_is_ignored_without_writing() {
    let mut store = loaded_store();

    assert_eq!(store.add("", Category::Work).unwrap(), None);
    assert_eq!(store.add("   ", Category::Travel).unwrap(), None);
    assert!(store.is_empty());
    assert_eq!(
        store.repository().store().get_item("@toDos").unwrap(),
        None
    );
}

#[test]
fn switching_lists_hides_but_keeps_other_category() {
    let mut store = loaded_store();
    store.set_active_category(Category::Travel).unwrap();
    let flight = store.add("Book flight", Category::Travel).unwrap().unwrap();

    let visible = store.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, flight);

    store.set_active_category(Category::Work).unwrap();
    assert!(store.visible().is_empty());
    assert!(store.get(&flight).is_some());
    assert_eq!(
        store
            .repository()
            .store()
            .get_item("@toDoTab")
            .unwrap()
            .as_deref(),
        Some("work")
    );
}

#[test]
fn rapid_adds_get_distinct_ids_in_creation_order() {
    let mut store = loaded_store();
    let ids: Vec<ToDoId> = ["one", "two", "three"]
        .into_iter()
        .map(|text| store.add(text, Category::Work).unwrap().unwrap())
        .collect();

    assert!(ids[0] < ids[1] && ids[1] < ids[2]);
    let texts: Vec<String> = store.visible().into_iter().map(|row| row.text).collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
}

#[test]
fn remove_asks_for_confirmation_and_respects_decline() {
    let mut store = loaded_store();
    let id = store.add("Call plumber", Category::Work).unwrap().unwrap();

    let mut seen = None;
    let outcome = store
        .remove(&id, |prompt: &DeletePrompt| {
            seen = Some(*prompt);
            false
        })
        .unwrap();

    assert_eq!(outcome, RemoveOutcome::Cancelled);
    assert_eq!(seen, Some(DELETE_PROMPT));
    assert_eq!(DELETE_PROMPT.confirm_label, "I'm Sure");
    assert!(store.get(&id).is_some());
}

#[test]
fn confirmed_remove_deletes_from_memory_and_storage() {
    let mut store = loaded_store();
    let keep = store.add("Keep", Category::Work).unwrap().unwrap();
    let drop_id = store.add("Drop", Category::Work).unwrap().unwrap();

    let outcome = store.remove(&drop_id, accept).unwrap();
    match outcome {
        RemoveOutcome::Removed(record) => assert_eq!(record.text, "Drop"),
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert!(store.get(&drop_id).is_none());
    let blob = persisted_blob(&store);
    assert!(blob.get(drop_id.as_str()).is_none());
    assert!(blob.get(keep.as_str()).is_some());
}

#[test]
fn confirmed_remove_of_unknown_id_is_noop() {
    let mut store = loaded_store();
    store.add("Only", Category::Work).unwrap();
    let before = store.records().clone();

    let ghost = ToDoId::from_millis(42);
    assert_eq!(store.remove(&ghost, accept).unwrap(), RemoveOutcome::Missing);
    assert_eq!(store.records(), &before);
}

#[test]
fn editing_updates_text_live_and_never_persists_flag() {
    let mut store = loaded_store();
    let id = store.add("Draft", Category::Work).unwrap().unwrap();

    let err = store.update_text(&id, "Too early").unwrap_err();
    assert!(matches!(err, StoreError::NotEditing(_)));

    store.begin_edit(&id).unwrap();
    assert!(store.is_editing(&id));
    assert!(store.visible()[0].editing);

    store.update_text(&id, "Final").unwrap();
    let blob = persisted_blob(&store);
    assert_eq!(blob[id.as_str()]["text"], serde_json::json!("Final"));
    let fields: Vec<&String> = blob[id.as_str()].as_object().unwrap().keys().collect();
    assert_eq!(fields.len(), 3, "unexpected persisted fields: {fields:?}");

    store.end_edit(&id).unwrap();
    assert!(!store.is_editing(&id));
    assert_eq!(store.get(&id).unwrap().text, "Final");
}

#[test]
fn operations_on_unknown_ids_return_not_found() {
    let mut store = loaded_store();
    let ghost = ToDoId::from_millis(7);

    assert!(matches!(
        store.toggle_complete(&ghost),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(store.begin_edit(&ghost), Err(StoreError::NotFound(_))));
    assert!(matches!(
        store.update_text(&ghost, "x"),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(store.end_edit(&ghost), Err(StoreError::NotFound(_))));
}

#[test]
fn reload_clears_editing_state() {
    let mut store = loaded_store();
    let id = store.add("Edit me", Category::Work).unwrap().unwrap();
    store.begin_edit(&id).unwrap();

    let report = store.load().unwrap();
    assert_eq!(report.todos, LoadStatus::Loaded);
    assert!(!store.is_editing(&id));
    assert_eq!(store.get(&id).unwrap().text, "Edit me");
}
