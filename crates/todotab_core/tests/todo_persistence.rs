use std::cell::Cell;
use std::rc::Rc;
use todotab_core::db::open_db_in_memory;
use todotab_core::{
    open_store, Category, KeyValueStore, KvError, KvResult, KvToDoRepository, LoadStatus,
    RemoveOutcome, SqliteKeyValueStore, StorageKeys, StoreError, ToDoId, ToDoStore,
};

/// Key-value store whose writes can be switched off to simulate a full disk.
struct FlakyKv {
    inner: SqliteKeyValueStore,
    fail_writes: Rc<Cell<bool>>,
}

impl KeyValueStore for FlakyKv {
    fn get_item(&self, key: &str) -> KvResult<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> KvResult<()> {
        if self.fail_writes.get() {
            return Err(KvError::Unavailable("disk full".to_string()));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> KvResult<()> {
        self.inner.remove_item(key)
    }
}

fn seeded_kv(entries: &[(&str, &str)]) -> SqliteKeyValueStore {
    let kv = SqliteKeyValueStore::new(open_db_in_memory().unwrap());
    for (key, value) in entries {
        kv.set_item(key, value).unwrap();
    }
    kv
}

#[test]
fn collection_survives_reopen_of_storage_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todotab.sqlite3");

    let (first_records, milk) = {
        let (mut store, report) = open_store(&path).unwrap();
        assert_eq!(report.todos, LoadStatus::Absent);
        let milk = store.add("Buy milk", Category::Work).unwrap().unwrap();
        store.add("Visit Kyoto", Category::Travel).unwrap();
        store.toggle_complete(&milk).unwrap();
        store.set_active_category(Category::Travel).unwrap();
        (store.records().clone(), milk)
    };

    let (store, report) = open_store(&path).unwrap();
    assert_eq!(report.todos, LoadStatus::Loaded);
    assert_eq!(report.active_category, LoadStatus::Loaded);
    assert_eq!(store.records(), &first_records);
    assert_eq!(store.active_category(), Category::Travel);
    assert!(store.get(&milk).unwrap().complete);
}

#[test]
fn corrupted_blob_is_reported_and_backed_up() {
    let kv = seeded_kv(&[("@toDos", "{\"1\": {\"text\": "), ("@toDoTab", "travel")]);
    let mut store = ToDoStore::new(KvToDoRepository::new(kv));

    let report = store.load().unwrap();
    assert!(matches!(report.todos, LoadStatus::Corrupted { .. }));
    assert_eq!(report.active_category, LoadStatus::Loaded);
    assert!(report.has_corruption());
    assert!(store.is_empty());
    assert_eq!(store.active_category(), Category::Travel);

    let backup = store
        .repository()
        .store()
        .get_item("@toDos.corrupt")
        .unwrap();
    assert_eq!(backup.as_deref(), Some("{\"1\": {\"text\": "));
}

#[test]
fn unknown_tab_value_falls_back_to_work() {
    let kv = seeded_kv(&[("@toDoTab", "leisure")]);
    let mut store = ToDoStore::new(KvToDoRepository::new(kv));

    let report = store.load().unwrap();
    assert!(matches!(
        report.active_category,
        LoadStatus::Corrupted { .. }
    ));
    assert_eq!(store.active_category(), Category::Work);
}

#[test]
fn legacy_blob_loads_and_is_rewritten_with_explicit_category() {
    let legacy = r#"{"1690000000000":{"text":"Expense report","work":true,"complete":false},"1690000000500":{"text":"Lisbon","work":false,"complete":true,"update":true}}"#;
    let kv = seeded_kv(&[("@toDos", legacy), ("@toDoTab", "work")]);
    let mut store = ToDoStore::new(KvToDoRepository::new(kv));

    assert_eq!(store.load().unwrap().todos, LoadStatus::Loaded);
    let lisbon = ToDoId::from_millis(1_690_000_000_500);
    assert_eq!(store.get(&lisbon).unwrap().category, Category::Travel);
    assert!(!store.is_editing(&lisbon));

    let report = ToDoId::from_millis(1_690_000_000_000);
    store.toggle_complete(&report).unwrap();
    let raw = store
        .repository()
        .store()
        .get_item("@toDos")
        .unwrap()
        .unwrap();
    assert!(!raw.contains("\"work\":"));
    assert!(!raw.contains("update"));
    assert!(raw.contains("\"category\":\"travel\""));
}

#[test]
fn failed_writes_leave_memory_and_storage_unchanged() {
    let fail_writes = Rc::new(Cell::new(false));
    let kv = FlakyKv {
        inner: SqliteKeyValueStore::new(open_db_in_memory().unwrap()),
        fail_writes: Rc::clone(&fail_writes),
    };
    let mut store = ToDoStore::new(KvToDoRepository::new(kv));
    store.load().unwrap();
    let id = store.add("Renew passport", Category::Travel).unwrap().unwrap();

    fail_writes.set(true);
    assert!(matches!(
        store.add("Lost", Category::Work),
        Err(StoreError::Repo(_))
    ));
    assert!(matches!(store.toggle_complete(&id), Err(StoreError::Repo(_))));
    assert!(matches!(
        store.remove(&id, |_: &todotab_core::DeletePrompt| true),
        Err(StoreError::Repo(_))
    ));
    assert!(matches!(
        store.set_active_category(Category::Travel),
        Err(StoreError::Repo(_))
    ));

    assert_eq!(store.len(), 1);
    assert!(!store.get(&id).unwrap().complete);
    assert_eq!(store.active_category(), Category::Work);

    store.begin_edit(&id).unwrap();
    assert!(store.end_edit(&id).is_err());
    assert!(store.is_editing(&id), "failed commit keeps edit open");

    fail_writes.set(false);
    store.end_edit(&id).unwrap();
    assert!(!store.is_editing(&id));
    assert!(matches!(
        store.remove(&id, |_: &todotab_core::DeletePrompt| true).unwrap(),
        RemoveOutcome::Removed(_)
    ));
}

#[test]
fn custom_keys_isolate_profiles_in_one_database() {
    let kv = SqliteKeyValueStore::new(open_db_in_memory().unwrap());
    {
        let mut personal =
            ToDoStore::new(KvToDoRepository::with_keys(&kv, StorageKeys::with_todos_key("@personal")));
        personal.load().unwrap();
        personal.add("Water plants", Category::Work).unwrap();
    }

    let mut default_store = ToDoStore::new(KvToDoRepository::new(&kv));
    assert_eq!(default_store.load().unwrap().todos, LoadStatus::Absent);
    assert!(kv.get_item("@personal").unwrap().is_some());
}

#[test]
fn add_fails_instead_of_replacing_record_at_largest_id() {
    let blob = r#"{"18446744073709551615":{"text":"Keep me","category":"work","complete":false}}"#;
    let kv = seeded_kv(&[("@toDos", blob)]);
    let mut store = ToDoStore::new(KvToDoRepository::new(kv));
    store.load().unwrap();

    assert!(matches!(
        store.add("Newcomer", Category::Work),
        Err(StoreError::IdsExhausted)
    ));
    assert_eq!(store.len(), 1);
    assert_eq!(
        store.get(&ToDoId::from_millis(u64::MAX)).unwrap().text,
        "Keep me"
    );
}
