use taskboard_core::{
    DurableStore, MemoryDurableStore, Task, TaskCategory, TaskDraft, TaskFilter, TaskId,
    TaskStatus, TaskStore, TASKS_KEY,
};

fn durable_tasks(store: &TaskStore<MemoryDurableStore>) -> Vec<Task> {
    let raw = store
        .durable()
        .read(TASKS_KEY)
        .unwrap()
        .expect("tasks key should be present");
    serde_json::from_str(&raw).unwrap()
}

fn draft(title: &str, status: TaskStatus, category: TaskCategory) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        description: format!("{title} description"),
        date: "2025-01-31".to_string(),
        status,
        category,
        image: None,
    }
}

#[test]
fn add_update_delete_scenario_keeps_durable_copy_in_step() {
    let mut store = TaskStore::open(MemoryDurableStore::new());
    assert!(store.tasks().is_empty());

    let added = store.add_task(TaskDraft::new("A")).unwrap();
    assert_eq!(store.tasks().len(), 1);
    assert!(!added.id.as_str().is_empty());
    assert_eq!(store.tasks()[0].title, "A");
    assert_eq!(durable_tasks(&store), store.tasks());

    let done = Task {
        status: TaskStatus::Done,
        ..added.clone()
    };
    assert!(store.update_task(done).unwrap());
    assert_eq!(store.tasks()[0].status, TaskStatus::Done);
    assert_eq!(durable_tasks(&store), store.tasks());

    assert!(store.delete_task(&added.id).unwrap());
    assert!(store.tasks().is_empty());
    assert_eq!(
        store.durable().read(TASKS_KEY).unwrap().as_deref(),
        Some("[]")
    );
}

#[test]
fn unknown_id_update_and_delete_leave_tasks_unchanged() {
    let mut store = TaskStore::open(MemoryDurableStore::new());
    store
        .add_task(draft("keep", TaskStatus::Pending, TaskCategory::Nature))
        .unwrap();
    let before = store.tasks().to_vec();

    let ghost = TaskDraft::new("ghost").into_task(TaskId::from("missing"));
    assert!(!store.update_task(ghost).unwrap());
    assert!(!store.delete_task(&TaskId::from("missing")).unwrap());

    assert_eq!(store.tasks(), before.as_slice());
    assert_eq!(durable_tasks(&store), before);
}

#[test]
fn update_preserves_position() {
    let mut store = TaskStore::open(MemoryDurableStore::new());
    let first = store.add_task(TaskDraft::new("first")).unwrap();
    let second = store.add_task(TaskDraft::new("second")).unwrap();
    let third = store.add_task(TaskDraft::new("third")).unwrap();

    let renamed = Task {
        title: "second, renamed".to_string(),
        ..second.clone()
    };
    store.update_task(renamed).unwrap();

    let ids: Vec<&TaskId> = store.tasks().iter().map(|task| &task.id).collect();
    assert_eq!(ids, vec![&first.id, &second.id, &third.id]);
    assert_eq!(store.tasks()[1].title, "second, renamed");
}

#[test]
fn tasks_round_trip_through_a_fresh_store() {
    let mut store = TaskStore::open(MemoryDurableStore::new());
    store
        .add_task(draft("paint", TaskStatus::Ongoing, TaskCategory::ArtsAndCraft))
        .unwrap();
    let mut with_image = draft("hike", TaskStatus::CollaborativeTask, TaskCategory::Nature);
    with_image.image = Some("data:image/png;base64,iVBORw0KGgo=".to_string());
    store.add_task(with_image).unwrap();
    store
        .add_task(draft("call mom", TaskStatus::Done, TaskCategory::Family))
        .unwrap();
    let expected = store.tasks().to_vec();

    let reopened = TaskStore::open(store.into_durable());
    assert_eq!(reopened.tasks(), expected.as_slice());
}

#[test]
fn persisted_task_json_uses_display_labels() {
    let mut store = TaskStore::open(MemoryDurableStore::new());
    store
        .add_task(draft(
            "pottery",
            TaskStatus::CollaborativeTask,
            TaskCategory::ArtsAndCraft,
        ))
        .unwrap();

    let raw = store.durable().read(TASKS_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["status"], "Collaborative Task");
    assert_eq!(json[0]["category"], "Arts and Craft");
    assert_eq!(json[0]["image"], serde_json::Value::Null);
}

#[test]
fn filter_and_find_follow_display_order() {
    let mut store = TaskStore::open(MemoryDurableStore::new());
    let run = store
        .add_task(draft("run", TaskStatus::Pending, TaskCategory::Sport))
        .unwrap();
    store
        .add_task(draft("breathe", TaskStatus::Done, TaskCategory::Meditation))
        .unwrap();
    let swim = store
        .add_task(draft("swim", TaskStatus::Pending, TaskCategory::Sport))
        .unwrap();

    let all = store.filter_tasks(&TaskFilter::default());
    assert_eq!(all.len(), 3);

    let pending_sport = store.filter_tasks(&TaskFilter {
        status: Some(TaskStatus::Pending),
        category: Some(TaskCategory::Sport),
    });
    let titles: Vec<&str> = pending_sport.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["run", "swim"]);

    assert_eq!(store.find_task(&swim.id).map(|t| &t.title), Some(&swim.title));
    assert_eq!(store.find_task(&run.id).map(|t| t.status), Some(TaskStatus::Pending));
    assert!(store.find_task(&TaskId::from("nope")).is_none());
}
