use taskboard_core::{
    DurableStore, MemoryDurableStore, TaskStore, UserProfile, TOKENS_KEY, USER_KEY,
};

fn alice() -> UserProfile {
    UserProfile::new("Alice", "a@x.com")
}

#[test]
fn set_token_twice_is_idempotent() {
    let mut once = TaskStore::open(MemoryDurableStore::new());
    once.set_token("tok1").unwrap();

    let mut twice = TaskStore::open(MemoryDurableStore::new());
    assert!(twice.set_token("tok1").unwrap());
    assert!(!twice.set_token("tok1").unwrap());

    assert_eq!(once.tokens(), twice.tokens());
    assert_eq!(
        twice.durable().read(TOKENS_KEY).unwrap().as_deref(),
        Some(r#"["tok1"]"#)
    );
}

#[test]
fn tokens_stay_unique_in_insertion_order() {
    let mut store = TaskStore::open(MemoryDurableStore::new());
    for token in ["b", "a", "b", "c", "a", "c"] {
        store.set_token(token).unwrap();
    }

    assert_eq!(store.tokens().as_slice(), ["b", "a", "c"]);
    assert_eq!(store.primary_token(), Some("b"));
    let persisted: Vec<String> =
        serde_json::from_str(&store.durable().read(TOKENS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted, vec!["b", "a", "c"]);
}

#[test]
fn clear_token_deletes_key_when_last_token_goes() {
    let mut store = TaskStore::open(MemoryDurableStore::new());
    store.set_token("tok1").unwrap();
    store.set_token("tok2").unwrap();

    assert!(store.clear_token("tok1").unwrap());
    assert_eq!(store.primary_token(), Some("tok2"));
    assert!(store.durable().read(TOKENS_KEY).unwrap().is_some());

    assert!(!store.clear_token("tok1").unwrap());
    assert!(store.clear_token("tok2").unwrap());
    assert!(store.tokens().is_empty());
    assert_eq!(store.durable().read(TOKENS_KEY).unwrap(), None);
}

#[test]
fn clearing_tokens_keeps_user_slice() {
    let mut store = TaskStore::open(MemoryDurableStore::new());
    store.set_user(alice()).unwrap();
    store.set_token("tok1").unwrap();
    assert!(store.durable().read(USER_KEY).unwrap().is_some());
    assert!(store.durable().read(TOKENS_KEY).unwrap().is_some());

    store.clear_all_tokens().unwrap();

    assert_eq!(store.durable().read(TOKENS_KEY).unwrap(), None);
    assert!(store.durable().read(USER_KEY).unwrap().is_some());
    assert_eq!(store.user(), Some(&alice()));
    assert!(store.is_authenticated());
}

#[test]
fn clear_user_deletes_key_and_keeps_tokens() {
    let mut store = TaskStore::open(MemoryDurableStore::new());
    store.set_user(alice()).unwrap();
    store.set_token("tok1").unwrap();

    store.clear_user().unwrap();

    assert_eq!(store.user(), None);
    assert!(!store.is_authenticated());
    assert_eq!(store.durable().read(USER_KEY).unwrap(), None);
    assert_eq!(store.primary_token(), Some("tok1"));
}

#[test]
fn sign_in_and_sign_out_move_both_slices_together() {
    let mut store = TaskStore::open(MemoryDurableStore::new());
    store.sign_in(alice(), "tok1").unwrap();

    assert_eq!(store.user(), Some(&alice()));
    assert_eq!(store.primary_token(), Some("tok1"));
    let user_json: serde_json::Value =
        serde_json::from_str(&store.durable().read(USER_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(user_json["name"], "Alice");
    assert_eq!(user_json["email"], "a@x.com");

    store.sign_out().unwrap();

    assert!(store.tokens().is_empty());
    assert_eq!(store.user(), None);
    assert_eq!(store.durable().keys().unwrap(), Vec::<String>::new());
}

#[test]
fn session_survives_reopen() {
    let mut store = TaskStore::open(MemoryDurableStore::new());
    store.sign_in(alice(), "tok1").unwrap();
    store.set_token("tok2").unwrap();

    let reopened = TaskStore::open(store.into_durable());
    assert_eq!(reopened.user(), Some(&alice()));
    assert_eq!(reopened.tokens().as_slice(), ["tok1", "tok2"]);
}
