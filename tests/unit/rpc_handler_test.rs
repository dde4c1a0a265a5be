//! Unit tests for the RPC handler — JSON-RPC methods dispatched by `handle_method`.
//!
//! These tests exercise the methods through the same code path used by the
//! real `noise-control-rpc` binary, with preferences in a temp directory.

use std::sync::Mutex;

use serde_json::{json, Value};
use tempfile::TempDir;

use noise_control::app::NoiseControl;
use noise_control::rpc_handler::handle_method;
use noise_control::services::donation_reminder::LoadReason;

/// Create a fresh, started app backed by a temp preferences file.
fn setup() -> (Mutex<NoiseControl>, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let prefs = tmp.path().join("prefs.json").to_string_lossy().to_string();
    let mut app = NoiseControl::new(Some(prefs), concat!(env!("CARGO_MANIFEST_DIR"), "/locales"));
    app.startup(LoadReason::Startup, 0);
    (Mutex::new(app), tmp)
}

fn call(app: &Mutex<NoiseControl>, method: &str, params: Value) -> Value {
    handle_method(app, method, &params).unwrap()
}

/// Opens a window with one tab and returns (window, tab).
fn open_tab(app: &Mutex<NoiseControl>) -> (String, String) {
    let window = call(app, "window.open", json!({}))["id"].as_str().unwrap().to_string();
    let tab = call(app, "tab.open", json!({"window": window, "url": "https://radio.example/"}))["id"]
        .as_str()
        .unwrap()
        .to_string();
    (window, tab)
}

// ─── Ping ───

#[test]
fn test_ping() {
    let (app, _tmp) = setup();
    assert_eq!(call(&app, "ping", json!({})), json!({"pong": true}));
}

// ─── Unknown method ───

#[test]
fn test_unknown_method_returns_error() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "nonexistent.method", &json!({}));
    assert!(res.unwrap_err().contains("unknown method"));
}

// ─── Tabs ───

#[test]
fn test_tab_open_requires_window() {
    let (app, _tmp) = setup();
    assert_eq!(handle_method(&app, "tab.open", &json!({})).unwrap_err(), "missing window");
    assert!(handle_method(&app, "tab.open", &json!({"window": "nope"})).is_err());
}

#[test]
fn test_tab_move_out_of_range() {
    let (app, _tmp) = setup();
    let (_window, tab) = open_tab(&app);
    let err = handle_method(&app, "tab.move", &json!({"id": tab, "index": 4})).unwrap_err();
    assert_eq!(err, "Invalid tab index: 4");
}

#[test]
fn test_tab_move_sends_check_noise() {
    let (app, _tmp) = setup();
    let (window, tab) = open_tab(&app);
    call(&app, "tab.open", json!({"window": window}));
    call(&app, "tab.move", json!({"id": tab, "index": 1}));
    let commands = call(&app, "prober.poll", json!({"tab": tab}));
    assert_eq!(commands, json!([{"name": "checkNoise"}]));
}

#[test]
fn test_window_close_releases_its_probers() {
    let (app, _tmp) = setup();
    let (window, tab) = open_tab(&app);
    call(&app, "tab.open", json!({"window": window}));
    call(&app, "prober.message", json!({"tab": tab, "name": "hasNoise", "data": true}));
    assert_eq!(app.lock().unwrap().hosted_prober_count(), 2);

    assert_eq!(call(&app, "window.close", json!({"window": window})), json!({"ok": true}));

    assert_eq!(app.lock().unwrap().hosted_prober_count(), 0);
    assert_eq!(call(&app, "prober.poll", json!({"tab": tab})), json!([]));
    assert_eq!(call(&app, "indicator.get", json!({"tab": tab})), Value::Null);
}

// ─── Probers & indicators ───

#[test]
fn test_prober_message_creates_indicator() {
    let (app, _tmp) = setup();
    let (_window, tab) = open_tab(&app);
    call(&app, "prober.message", json!({"tab": tab, "name": "NoiseControl:hasNoise", "data": true}));

    let indicator = call(&app, "indicator.get", json!({"tab": tab}));
    assert_eq!(indicator["state"]["noisy"], true);
    assert_eq!(indicator["visual"]["icon"], "noisy");
    assert_eq!(indicator["visual"]["collapsed"], false);
}

#[test]
fn test_prober_message_rejects_bad_payload() {
    let (app, _tmp) = setup();
    let (_window, tab) = open_tab(&app);
    let err = handle_method(&app, "prober.message", &json!({"tab": tab, "name": "hasNoise", "data": 1}))
        .unwrap_err();
    assert!(err.starts_with("Invalid payload for hasNoise"));
    let err = handle_method(&app, "prober.message", &json!({"tab": tab, "name": "bogus"})).unwrap_err();
    assert_eq!(err, "Unknown message: bogus");
}

#[test]
fn test_indicator_get_unknown_is_null() {
    let (app, _tmp) = setup();
    let (_window, tab) = open_tab(&app);
    assert_eq!(call(&app, "indicator.get", json!({"tab": tab})), Value::Null);
}

#[test]
fn test_indicator_click_mutes_prober() {
    let (app, _tmp) = setup();
    let (_window, tab) = open_tab(&app);
    call(&app, "prober.message", json!({"tab": tab, "name": "hasNoise", "data": true}));
    call(&app, "indicator.click", json!({"tab": tab}));
    assert_eq!(
        call(&app, "prober.poll", json!({"tab": tab})),
        json!([{"name": "mute", "data": true}])
    );
    assert_eq!(call(&app, "prober.poll", json!({"tab": tab})), json!([]));
}

#[test]
fn test_snapshot_lists_visible_tabs() {
    let (app, _tmp) = setup();
    let (window, tab) = open_tab(&app);
    call(&app, "tab.open", json!({"window": window}));
    call(&app, "prober.message", json!({"tab": tab, "name": "hasPlugins", "data": true}));
    let snapshot = call(&app, "snapshot", json!({}));
    assert_eq!(snapshot[0]["window"], window);
    assert_eq!(snapshot[0]["tabs"].as_array().unwrap().len(), 1);
    assert_eq!(snapshot[0]["tabs"][0]["has_plugins"], true);
}

// ─── Sidebar ───

#[test]
fn test_sidebar_round_trip() {
    let (app, _tmp) = setup();
    let (_window, tab) = open_tab(&app);
    call(&app, "prober.message", json!({"tab": tab, "name": "hasNoise", "data": true}));

    let attached = call(&app, "sidebar.attach", json!({}));
    let session = attached["session"].as_str().unwrap().to_string();
    assert_eq!(attached["title"], "Noise Control");
    assert!(attached["html"].as_str().unwrap().contains(&tab));

    let clicked = call(&app, "sidebar.click", json!({"session": session, "id": tab, "checked": true}));
    assert_eq!(clicked["ok"], true);
    assert_eq!(
        call(&app, "prober.poll", json!({"tab": tab})),
        json!([{"name": "mute", "data": true}])
    );

    let polled = call(&app, "sidebar.poll", json!({"session": session}));
    assert_eq!(polled["messages"][0]["name"], "tabchanged");
    assert!(polled["html"].as_str().unwrap().contains("checked"));

    assert_eq!(call(&app, "sidebar.detach", json!({"session": session}))["ok"], true);
    assert_eq!(call(&app, "sidebar.detach", json!({"session": session}))["ok"], false);
}

#[test]
fn test_sidebar_intent_without_state_does_nothing() {
    let (app, _tmp) = setup();
    let (_window, tab) = open_tab(&app);
    call(&app, "prober.message", json!({"tab": tab, "name": "hasNoise", "data": true}));
    call(&app, "sidebar.intent", json!({"id": tab}));
    assert_eq!(call(&app, "prober.poll", json!({"tab": tab})), json!([]));
    assert_eq!(call(&app, "indicator.get", json!({"tab": tab}))["state"]["muted"], false);
}

#[test]
fn test_sidebar_invalid_session() {
    let (app, _tmp) = setup();
    let err = handle_method(&app, "sidebar.poll", &json!({"session": "not-a-uuid"})).unwrap_err();
    assert_eq!(err, "invalid session: not-a-uuid");
}

#[test]
fn test_closed_tab_disappears_from_sidebar() {
    let (app, _tmp) = setup();
    let (_window, tab) = open_tab(&app);
    call(&app, "prober.message", json!({"tab": tab, "name": "hasNoise", "data": true}));
    let session = call(&app, "sidebar.attach", json!({}))["session"].as_str().unwrap().to_string();

    call(&app, "tab.close", json!({"id": tab}));
    let polled = call(&app, "sidebar.poll", json!({"session": session}));
    assert_eq!(polled["messages"][0]["name"], "everything");
    assert!(!polled["html"].as_str().unwrap().contains(&tab));

    // Late report from the closed tab.
    call(&app, "prober.message", json!({"tab": tab, "name": "hasNoise", "data": true}));
    assert_eq!(call(&app, "indicator.get", json!({"tab": tab})), Value::Null);
}

// ─── Preferences & strings ───

#[test]
fn test_prefs_set_recolours_indicators() {
    let (app, _tmp) = setup();
    let (_window, tab) = open_tab(&app);
    call(&app, "prober.message", json!({"tab": tab, "name": "hasNoise", "data": true}));
    call(&app, "prefs.set", json!({"key": "indicator.colour", "value": "#123456"}));
    assert_eq!(call(&app, "prefs.get", json!({"key": "indicator.colour"})), json!("#123456"));
    assert_eq!(call(&app, "indicator.get", json!({"tab": tab}))["visual"]["fill"], "#123456");
}

#[test]
fn test_prefs_set_unknown_key() {
    let (app, _tmp) = setup();
    assert!(handle_method(&app, "prefs.set", &json!({"key": "volume", "value": 3})).is_err());
    assert!(handle_method(&app, "prefs.get", &json!({"key": "volume"})).is_err());
}

#[test]
fn test_i18n_t() {
    let (app, _tmp) = setup();
    assert_eq!(call(&app, "i18n.t", json!({"key": "sidebar.title"}))["text"], "Noise Control");
    assert_eq!(call(&app, "i18n.t", json!({"key": "no.such.key"}))["text"], "no.such.key");
}

#[test]
fn test_idle_without_upgrade_is_null() {
    let (app, _tmp) = setup();
    assert_eq!(call(&app, "idle", json!({})), Value::Null);
}
