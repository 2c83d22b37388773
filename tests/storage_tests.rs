mod common;

use std::rc::Rc;

use common::fixtures::{field, login_form, temp_path};
use saveform::{FileStorage, FormStateError, MemoryStorage, Options, SaveForm, Storage};

// =========================================================================
// MemoryStorage
// =========================================================================

#[test]
fn memory_storage_last_write_wins() {
    let storage = MemoryStorage::new();
    storage.set_item("k", "1").unwrap();
    storage.set_item("k", "2").unwrap();

    assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("2"));
    assert_eq!(storage.write_count(), 2);

    storage.remove_item("k").unwrap();
    storage.remove_item("k").unwrap();
    assert!(storage.is_empty());
}

#[test]
fn memory_storage_can_simulate_quota_errors() {
    let storage = MemoryStorage::new();
    storage.fail_writes(true);

    let err = storage.set_item("k", "v").unwrap_err();

    assert!(matches!(err, FormStateError::Storage { ref key, .. } if key == "k"));
    assert_eq!(storage.get_item("k").unwrap(), None);
}

// =========================================================================
// FileStorage
// =========================================================================

#[test]
fn file_storage_persists_across_instances() {
    let path = temp_path("store");
    {
        let store = FileStorage::open(&path).unwrap();
        assert!(store.keys().is_empty(), "Missing file opens as empty store");
        store.set_item("saveform_a", r#"{"x":"1"}"#).unwrap();
        store.set_item("saveform_b", "raw").unwrap();
        store.remove_item("saveform_b").unwrap();
    }

    let reopened = FileStorage::open(&path).unwrap();
    assert_eq!(reopened.keys(), vec!["saveform_a"]);
    assert_eq!(
        reopened.get_item("saveform_a").unwrap().as_deref(),
        Some(r#"{"x":"1"}"#)
    );

    let _ = std::fs::remove_file(&path);
}

#[test]
fn file_storage_rejects_malformed_file() {
    let path = temp_path("malformed");
    std::fs::write(&path, "not a json object").unwrap();

    let err = FileStorage::open(&path).unwrap_err();

    assert!(matches!(err, FormStateError::JsonParse { .. }), "Got {:?}", err);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn file_storage_keeps_memory_in_step_with_disk_on_write_failure() {
    let path = temp_path("missing-dir").join("store.json");
    let store = FileStorage::open(&path).unwrap();

    let err = store.set_item("saveform_a", "{}").unwrap_err();

    assert!(matches!(err, FormStateError::StorageIo { .. }), "Got {:?}", err);
    assert_eq!(store.get_item("saveform_a").unwrap(), None, "Failed write is rolled back");
    assert!(store.keys().is_empty());
}

#[test]
fn snapshot_survives_a_new_session_through_file_storage() {
    let path = temp_path("session");

    {
        let (document, form) = login_form();
        let store = Rc::new(FileStorage::open(&path).unwrap());
        let saver = SaveForm::create(&document, &form, Options::new().storage(store)).unwrap();
        field(&form, "username").set_value("persisted");
        saver.save().unwrap();
    }

    let (document, form) = login_form();
    let store = Rc::new(FileStorage::open(&path).unwrap());
    let saver = SaveForm::create(&document, &form, Options::new().storage(store)).unwrap();

    assert_eq!(field(&form, "username").value(), "persisted");
    assert_eq!(saver.restore().unwrap(), Some(vec!["username".to_string()]));

    let _ = std::fs::remove_file(&path);
}
