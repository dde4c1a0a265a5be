use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable opaque handle for one tab. Never reused after the tab closes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabIdentity(String);

impl TabIdentity {
    /// Generates a fresh identity.
    pub fn generate() -> Self {
        Self(format!("panel-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TabIdentity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TabIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TabIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a browser window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(String);

impl WindowId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WindowId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A browser tab as seen by the chrome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabIdentity,
    pub window: WindowId,
    pub url: String,
    pub title: String,
    pub favicon: Option<String>,
    pub pinned: bool,
    pub selected: bool,
    pub visually_selected: bool,
    /// Whether the tab strip draws a close button for this tab.
    pub has_close_button: bool,
    pub created_at: i64,
}

/// A browser window holding tabs in strip order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Window {
    pub id: WindowId,
    pub tab_order: Vec<TabIdentity>,
    pub selected_tab: Option<TabIdentity>,
}
