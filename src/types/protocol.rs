//! Typed messages exchanged between probers, the registry and sidebar views.
//!
//! Each channel pair has its own enum. Values arriving from outside the crate
//! (the RPC host, legacy string-named messages) go through the `decode_*`
//! functions, which reject anything that does not fit the protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ProtocolError;
use super::indicator::{TabRecord, WindowSnapshot};
use super::tab::TabIdentity;

/// Prober → Registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "camelCase")]
pub enum ProberMessage {
    HasNoise(bool),
    HasPlugins(bool),
    Unloaded,
    /// Media was unmuted through a native control while mute was in effect.
    Unmuted,
    /// The browser changed its hidden-plugin UI for this tab.
    PluginUiUpdated,
}

/// A prober message tagged with the tab it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProberReport {
    pub tab: TabIdentity,
    pub message: ProberMessage,
}

/// Registry → Prober.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "camelCase")]
pub enum ProberCommand {
    Mute(bool),
    CheckNoise,
    CheckPlugins,
    Disable,
}

/// Registry → Sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "lowercase")]
pub enum SidebarMessage {
    Everything(Vec<WindowSnapshot>),
    TabChanged(TabRecord),
}

/// Sidebar → Registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum SidebarIntent {
    AudioStateChanged {
        id: TabIdentity,
        /// `None` leaves the current mute state untouched.
        state: Option<bool>,
    },
}

const LEGACY_PREFIX: &str = "NoiseControl:";
const HIDDEN_PLUGIN_UI: &str = "PluginContent:UpdateHiddenPluginUI";

fn expect_bool(name: &str, data: &Value) -> Result<bool, ProtocolError> {
    data.as_bool().ok_or_else(|| ProtocolError::InvalidPayload {
        message: name.to_string(),
        reason: format!("expected boolean, got {}", data),
    })
}

/// Decodes a string-named prober message such as `NoiseControl:hasNoise`.
///
/// The `NoiseControl:` prefix is optional.
pub fn decode_prober_message(name: &str, data: &Value) -> Result<ProberMessage, ProtocolError> {
    if name == HIDDEN_PLUGIN_UI {
        return Ok(ProberMessage::PluginUiUpdated);
    }
    let short = name.strip_prefix(LEGACY_PREFIX).unwrap_or(name);
    match short {
        "hasNoise" => Ok(ProberMessage::HasNoise(expect_bool(name, data)?)),
        "hasPlugins" => Ok(ProberMessage::HasPlugins(expect_bool(name, data)?)),
        "unloaded" => Ok(ProberMessage::Unloaded),
        "unmuted" => Ok(ProberMessage::Unmuted),
        "pluginUiUpdated" => Ok(ProberMessage::PluginUiUpdated),
        _ => Err(ProtocolError::UnknownMessage(name.to_string())),
    }
}

/// Returns the legacy wire name of a command sent to a prober.
pub fn command_name(command: &ProberCommand) -> &'static str {
    match command {
        ProberCommand::Mute(_) => "NoiseControl:mute",
        ProberCommand::CheckNoise => "NoiseControl:checkNoise",
        ProberCommand::CheckPlugins => "NoiseControl:checkPlugins",
        ProberCommand::Disable => "NoiseControl:disable",
    }
}

/// Decodes an `audioStateChanged` payload: `{"id": "...", "state": true}`.
///
/// A missing or non-boolean `state` decodes to `None`.
pub fn decode_sidebar_intent(data: &Value) -> Result<SidebarIntent, ProtocolError> {
    let id = data
        .get("id")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProtocolError::InvalidPayload {
            message: "audioStateChanged".to_string(),
            reason: "missing tab id".to_string(),
        })?;
    let state = data.get("state").and_then(|v| v.as_bool());
    Ok(SidebarIntent::AudioStateChanged {
        id: TabIdentity::from(id),
        state,
    })
}
