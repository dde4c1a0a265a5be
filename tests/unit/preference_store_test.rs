//! Unit tests for the preference store: persistence, dotted keys and change
//! notifications.

use serde_json::json;
use tempfile::TempDir;

use noise_control::services::preference_store::{PreferenceStore, PreferenceStoreTrait};
use noise_control::types::errors::PreferenceError;
use noise_control::types::settings::{NoiseControlPrefs, CURRENT_COLOR};

fn setup() -> (PreferenceStore, TempDir) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("prefs.json").to_string_lossy().to_string();
    (PreferenceStore::new(Some(path)), tmp)
}

#[test]
fn test_defaults() {
    let prefs = NoiseControlPrefs::default();
    assert_eq!(prefs.indicator.colour, CURRENT_COLOR);
    assert_eq!(prefs.donationreminder, 0);
}

#[test]
fn test_set_value_persists_across_instances() {
    let (mut store, tmp) = setup();
    store.load().unwrap();
    store.set_value("indicator.colour", json!("#00ff00")).unwrap();

    let mut reopened = PreferenceStore::new(Some(tmp.path().join("prefs.json").to_string_lossy().to_string()));
    let prefs = reopened.load().unwrap();
    assert_eq!(prefs.indicator.colour, "#00ff00");
}

#[test]
fn test_get_value_by_dotted_key() {
    let (mut store, _tmp) = setup();
    store.load().unwrap();
    assert_eq!(store.get_value("indicator.colour"), Some(json!("currentcolor")));
    assert_eq!(store.get_value("donationreminder"), Some(json!(0)));
    assert_eq!(store.get_value("indicator.size"), None);
}

#[test]
fn test_unknown_key_rejected() {
    let (mut store, _tmp) = setup();
    assert!(matches!(store.set_value("indicator.size", json!(3)), Err(PreferenceError::InvalidKey(_))));
    assert!(matches!(store.set_value("", json!(3)), Err(PreferenceError::InvalidKey(_))));
    assert!(matches!(
        store.set_value("donationreminder.when", json!(3)),
        Err(PreferenceError::InvalidKey(_))
    ));
}

#[test]
fn test_malformed_file_is_serialization_error() {
    let (mut store, tmp) = setup();
    std::fs::write(tmp.path().join("prefs.json"), "{ not json").unwrap();
    assert!(matches!(store.load(), Err(PreferenceError::SerializationError(_))));
}

#[test]
fn test_subscribers_receive_changes() {
    let (mut store, _tmp) = setup();
    let mut rx = store.subscribe();
    store.set_value("indicator.colour", json!("red")).unwrap();
    let change = rx.try_recv().unwrap();
    assert_eq!(change.key, "indicator.colour");
    assert_eq!(change.value, json!("red"));
}

#[test]
fn test_rejected_value_is_not_announced() {
    let (mut store, _tmp) = setup();
    let mut rx = store.subscribe();
    assert!(store.set_value("indicator.colour", json!(12)).is_err());
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_dropped_subscriber_does_not_break_updates() {
    let (mut store, _tmp) = setup();
    drop(store.subscribe());
    let mut live = store.subscribe();
    store.set_value("donationreminder", json!(42)).unwrap();
    assert_eq!(live.try_recv().unwrap().value, json!(42));
    assert_eq!(store.get_prefs().donationreminder, 42);
}
