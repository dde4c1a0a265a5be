//! RPC method handler for the Noise Control JSON-lines protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! The `handle_method` function validates parameters at the boundary and
//! dispatches to the coordinator and collaborators held by `NoiseControl`.

use std::sync::Mutex;

use serde_json::{json, Value};

use crate::app::{now_secs, NoiseControl};
use crate::managers::indicator_registry::SessionId;
use crate::services::localization_engine::LocalizationEngineTrait;
use crate::services::preference_store::PreferenceStoreTrait;
use crate::types::protocol::{decode_prober_message, decode_sidebar_intent};
use crate::types::tab::{TabIdentity, WindowId};

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn tab_param(params: &Value, key: &str) -> Result<TabIdentity, String> {
    str_param(params, key).map(TabIdentity::from)
}

fn window_param(params: &Value) -> Result<WindowId, String> {
    str_param(params, "window").map(WindowId::from)
}

fn session_param(params: &Value) -> Result<SessionId, String> {
    let raw = str_param(params, "session")?;
    SessionId::parse(raw).ok_or_else(|| format!("invalid session: {}", raw))
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<NoiseControl>, method: &str, params: &Value) -> Result<Value, String> {
    let mut a = app.lock().map_err(|e| e.to_string())?;
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Windows & tabs ───
        "window.open" => {
            let id = a.coordinator.open_window();
            Ok(json!({"id": id}))
        }
        "window.close" => {
            let window = window_param(params)?;
            a.close_window(&window).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "window.focus" => {
            let window = window_param(params)?;
            a.coordinator.focus_window(&window).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "tab.open" => {
            let window = window_param(params)?;
            let url = params.get("url").and_then(|v| v.as_str());
            let id = a.open_tab(&window, url).map_err(|e| e.to_string())?;
            Ok(json!({"id": id}))
        }
        "tab.close" => {
            let tab = tab_param(params, "id")?;
            a.close_tab(&tab).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "tab.move" => {
            let tab = tab_param(params, "id")?;
            let index = params.get("index").and_then(|v| v.as_u64()).ok_or("missing index")?;
            a.coordinator.move_tab(&tab, index as usize).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "tab.pin" => {
            let tab = tab_param(params, "id")?;
            let pinned = params.get("pinned").and_then(|v| v.as_bool()).ok_or("missing pinned")?;
            a.coordinator.set_pinned(&tab, pinned).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "tab.select" => {
            let tab = tab_param(params, "id")?;
            a.coordinator.select_tab(&tab).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "tab.update" => {
            let tab = tab_param(params, "id")?;
            let title = params.get("title").and_then(|v| v.as_str());
            let icon = params.get("icon").map(|v| v.as_str());
            a.coordinator.set_tab_metadata(&tab, title, icon).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Probers ───
        "prober.message" => {
            let tab = tab_param(params, "tab")?;
            let name = str_param(params, "name")?;
            let data = params.get("data").cloned().unwrap_or(Value::Null);
            let message = decode_prober_message(name, &data).map_err(|e| e.to_string())?;
            a.coordinator.prober_event(&tab, message);
            Ok(json!({"ok": true}))
        }
        "prober.poll" => {
            let tab = tab_param(params, "tab")?;
            let commands = a.poll_prober(&tab);
            serde_json::to_value(commands).map_err(|e| e.to_string())
        }

        // ─── Sidebar ───
        "sidebar.attach" => {
            let session = a.attach_sidebar();
            let html = a.sidebar_view(&session).map(|v| v.render_html()).unwrap_or_default();
            Ok(json!({"session": session, "title": a.sidebar_title(), "html": html}))
        }
        "sidebar.detach" => {
            let session = session_param(params)?;
            let ok = a.detach_sidebar(&session);
            Ok(json!({"ok": ok}))
        }
        "sidebar.poll" => {
            let session = session_param(params)?;
            let messages = a.poll_sidebar(&session);
            let html = a.sidebar_view(&session).map(|v| v.render_html());
            Ok(json!({"messages": messages, "html": html}))
        }
        "sidebar.click" => {
            let session = session_param(params)?;
            let tab = tab_param(params, "id")?;
            let checked = params.get("checked").and_then(|v| v.as_bool()).ok_or("missing checked")?;
            let ok = a.click_sidebar_mute(&session, &tab, checked);
            Ok(json!({"ok": ok}))
        }
        "sidebar.intent" => {
            let intent = decode_sidebar_intent(params).map_err(|e| e.to_string())?;
            a.coordinator.sidebar_intent(intent);
            Ok(json!({"ok": true}))
        }

        // ─── Indicators ───
        "indicator.click" => {
            let tab = tab_param(params, "tab")?;
            a.coordinator.indicator_click(&tab);
            Ok(json!({"ok": true}))
        }
        "indicator.get" => {
            let tab = tab_param(params, "tab")?;
            match a.coordinator.indicator(&tab) {
                Some(indicator) => Ok(json!({
                    "state": indicator.state,
                    "visual": indicator.visual,
                    "close_button": indicator.close_button,
                })),
                None => Ok(Value::Null),
            }
        }
        "snapshot" => serde_json::to_value(a.coordinator.snapshot()).map_err(|e| e.to_string()),

        // ─── Preferences & strings ───
        "prefs.get" => {
            let key = str_param(params, "key")?;
            a.prefs.get_value(key).ok_or_else(|| format!("unknown preference: {}", key))
        }
        "prefs.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            a.set_pref(key, value).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "i18n.t" => {
            let key = str_param(params, "key")?;
            Ok(json!({"text": a.localization.t(key, None)}))
        }
        "idle" => match a.idle(now_secs()) {
            Some(n) => Ok(json!({
                "id": n.id,
                "message": n.message,
                "button_label": n.button_label,
                "access_key": n.access_key,
                "url": n.url,
            })),
            None => Ok(Value::Null),
        },

        _ => Err(format!("unknown method: {}", method)),
    }
}
