use taskboard_core::{
    DurableStore, MemoryDurableStore, TaskId, TaskStatus, TaskStore, UserProfile, TASKS_KEY,
    TOKENS_KEY, USER_KEY,
};

const LEGACY_TASKS: &str = r#"[
    {"id":"1712345678901","title":"Paint","description":"Canvas","date":"2024-04-05",
     "status":"Ongoing","category":"Arts and Craft","image":null},
    {"id":"1712345678999","title":"Walk","description":"Park","date":"2024-04-06",
     "status":"Collaborative Task","category":"Nature"}
]"#;

#[test]
fn invalid_tasks_json_yields_empty_collection() {
    let durable = MemoryDurableStore::with_entries([(TASKS_KEY, "{not json")]);
    let store = TaskStore::open(durable);

    assert!(store.tasks().is_empty());
    assert_eq!(store.durable().get(TASKS_KEY), None);
}

#[test]
fn wrong_shape_slices_fall_back_independently() {
    let durable = MemoryDurableStore::with_entries([
        (TASKS_KEY, r#"{"id":"1"}"#),
        (TOKENS_KEY, r#"["tok1","tok2"]"#),
        (USER_KEY, "undefined"),
    ]);
    let store = TaskStore::open(durable);

    assert!(store.tasks().is_empty());
    assert_eq!(store.tokens().as_slice(), ["tok1", "tok2"]);
    assert_eq!(store.user(), None);
    assert_eq!(store.durable().get(USER_KEY), None);
    assert!(store.durable().get(TOKENS_KEY).is_some());
}

#[test]
fn tokens_of_wrong_type_are_discarded() {
    let durable = MemoryDurableStore::with_entries([(TOKENS_KEY, "[1,2,3]")]);
    let store = TaskStore::open(durable);
    assert!(store.tokens().is_empty());
}

#[test]
fn legacy_timestamp_ids_and_missing_image_are_accepted() {
    let durable = MemoryDurableStore::with_entries([(TASKS_KEY, LEGACY_TASKS)]);
    let store = TaskStore::open(durable);

    assert_eq!(store.tasks().len(), 2);
    let walk = store.find_task(&TaskId::from("1712345678999")).unwrap();
    assert_eq!(walk.status, TaskStatus::CollaborativeTask);
    assert_eq!(walk.image, None);
}

#[test]
fn duplicate_ids_and_tokens_collapse_to_first_occurrence() {
    let tasks = r#"[
        {"id":"7","title":"first","description":"","date":"","status":"Pending","category":"Sport"},
        {"id":"7","title":"second","description":"","date":"","status":"Done","category":"Sport"}
    ]"#;
    let durable = MemoryDurableStore::with_entries([
        (TASKS_KEY, tasks),
        (TOKENS_KEY, r#"["a","b","a"]"#),
    ]);
    let store = TaskStore::open(durable);

    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].title, "first");
    assert_eq!(store.tokens().as_slice(), ["a", "b"]);

    let stored_tasks: Vec<serde_json::Value> =
        serde_json::from_str(store.durable().get(TASKS_KEY).unwrap()).unwrap();
    assert_eq!(stored_tasks.len(), 1);
    assert_eq!(stored_tasks[0]["title"], "first");
    assert_eq!(store.durable().get(TOKENS_KEY), Some(r#"["a","b"]"#));
}

#[test]
fn clean_slices_are_not_rewritten_on_open() {
    let raw_tokens = r#"[ "a", "b" ]"#;
    let durable =
        MemoryDurableStore::with_entries([(TASKS_KEY, LEGACY_TASKS), (TOKENS_KEY, raw_tokens)]);
    let store = TaskStore::open(durable);

    assert_eq!(store.durable().get(TASKS_KEY), Some(LEGACY_TASKS));
    assert_eq!(store.durable().get(TOKENS_KEY), Some(raw_tokens));
}

#[test]
fn null_user_means_signed_out() {
    let durable = MemoryDurableStore::with_entries([(USER_KEY, "null")]);
    let store = TaskStore::open(durable);
    assert!(!store.is_authenticated());
}

#[test]
fn valid_user_is_restored() {
    let durable =
        MemoryDurableStore::with_entries([(USER_KEY, r#"{"name":"Alice","email":"a@x.com"}"#)]);
    let store = TaskStore::open(durable);
    assert_eq!(store.user(), Some(&UserProfile::new("Alice", "a@x.com")));
}

#[test]
fn missing_keys_are_not_written_on_open() {
    let store = TaskStore::open(MemoryDurableStore::new());
    assert!(store.durable().keys().unwrap().is_empty());
}
