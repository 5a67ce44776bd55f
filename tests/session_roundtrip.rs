//! Session persistence integration tests against the file-backed store:
//! what a desktop client actually reboots with.

mod common;

use std::sync::Arc;

use dashgate::{FileStorage, KeyValueStorage, SessionStore, SESSION_TTL_MS};
use pretty_assertions::assert_eq;

use common::demo_profile;

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[test]
fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let store = SessionStore::new(Arc::new(FileStorage::at_path(&path)));
    store.save("abc", &demo_profile());
    drop(store);

    // a fresh process opens the same file
    let reopened = SessionStore::new(Arc::new(FileStorage::at_path(&path)));
    assert!(reopened.is_valid());
    let session = reopened.load().expect("session survives restart");
    assert_eq!(session.token, "abc");
    assert_eq!(session.user, demo_profile());
}

#[test]
fn test_expired_session_is_invalid_on_reboot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let storage = Arc::new(FileStorage::at_path(&path));
    let store = SessionStore::new(storage.clone());
    store.save("abc", &demo_profile());

    // simulate the clock passing the TTL by rewinding the stored timestamp
    let stale = now_millis() - SESSION_TTL_MS - 1;
    storage.set("login_timestamp", &stale.to_string());

    assert!(!store.is_valid());
    assert!(store.load().is_none());

    // and the same holds for a fresh process
    let reopened = SessionStore::new(Arc::new(FileStorage::at_path(&path)));
    assert!(!reopened.is_valid());
    assert!(reopened.load().is_none());
}

#[test]
fn test_clear_twice_matches_clear_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(Arc::new(FileStorage::at_path(
        dir.path().join("storage.json"),
    )));
    store.save("abc", &demo_profile());

    store.clear();
    assert!(store.load().is_none());
    assert!(!store.is_valid());

    store.clear();
    assert!(store.load().is_none());
    assert!(!store.is_valid());
}

#[test]
fn test_corrupt_store_degrades_to_logged_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "definitely not json").unwrap();

    let store = SessionStore::new(Arc::new(FileStorage::at_path(&path)));
    assert!(store.load().is_none());
    assert!(!store.is_valid());

    // still usable afterwards
    store.save("abc", &demo_profile());
    assert!(store.is_valid());
}

#[test]
fn test_remembered_username_survives_restart_and_logout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let store = SessionStore::new(Arc::new(FileStorage::at_path(&path)));
    store.remember_username("emilys");
    store.save("abc", &demo_profile());
    store.clear();
    drop(store);

    let reopened = SessionStore::new(Arc::new(FileStorage::at_path(&path)));
    assert_eq!(reopened.remembered_username(), Some("emilys".to_string()));
    assert!(reopened.load().is_none());
}
