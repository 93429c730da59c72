use std::sync::{Arc, Mutex};
use taskboard_core::{
    ClearReason, DurableStore, MemoryDurableStore, Slice, StoreChange, TaskDraft, TaskStore,
    UserProfile, TASKS_KEY,
};

type Seen = Arc<Mutex<Vec<StoreChange>>>;

fn recording_store() -> (TaskStore<MemoryDurableStore>, Seen) {
    let mut store = TaskStore::open(MemoryDurableStore::new());
    let seen: Seen = Arc::default();
    let sink = Arc::clone(&seen);
    store.subscribe(move |change, _state| {
        sink.lock().unwrap().push(change.clone());
    });
    (store, seen)
}

#[test]
fn listeners_see_committed_state() {
    let mut store = TaskStore::open(MemoryDurableStore::new());
    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);
    store.subscribe(move |change, state| {
        if let StoreChange::TaskAdded(id) = change {
            let found = state.find_task(id).map(|task| task.title.clone());
            sink.lock().unwrap().push(found);
        }
    });

    store.add_task(TaskDraft::new("A")).unwrap();

    assert_eq!(*observed.lock().unwrap(), vec![Some("A".to_string())]);
    let raw = store.durable().read(TASKS_KEY).unwrap().unwrap();
    assert!(raw.contains("\"A\""));
}

#[test]
fn each_change_is_reported_once_and_no_ops_are_silent() {
    let (mut store, seen) = recording_store();

    let task = store.add_task(TaskDraft::new("A")).unwrap();
    store.delete_task(&task.id).unwrap();
    store.delete_task(&task.id).unwrap();
    store.set_token("tok1").unwrap();
    store.set_token("tok1").unwrap();
    store.set_user(UserProfile::new("Alice", "a@x.com")).unwrap();
    store.set_user(UserProfile::new("Alice", "a@x.com")).unwrap();
    store.sign_out().unwrap();
    store.sign_out().unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            StoreChange::TaskAdded(task.id.clone()),
            StoreChange::TaskDeleted(task.id),
            StoreChange::TokensChanged,
            StoreChange::UserChanged,
            StoreChange::SessionCleared(ClearReason::SignOut),
        ]
    );
}

#[test]
fn listeners_run_in_registration_order_and_can_unsubscribe() {
    let mut store = TaskStore::open(MemoryDurableStore::new());
    let order = Arc::new(Mutex::new(Vec::new()));

    let first_sink = Arc::clone(&order);
    let first = store.subscribe(move |_, _| first_sink.lock().unwrap().push("first"));
    let second_sink = Arc::clone(&order);
    store.subscribe(move |_, _| second_sink.lock().unwrap().push("second"));

    store.set_token("tok1").unwrap();
    assert!(store.unsubscribe(first));
    assert!(!store.unsubscribe(first));
    store.set_token("tok2").unwrap();

    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "second"]);
    assert_eq!(store.subscriber_count(), 1);
}

#[test]
fn change_slices_name_touched_keys() {
    assert_eq!(StoreChange::TokensChanged.slices(), &[Slice::Tokens]);
    let keys: Vec<&str> = StoreChange::SignedIn
        .slices()
        .iter()
        .map(|slice| slice.key())
        .collect();
    assert_eq!(keys, vec!["tokens", "user"]);
}
