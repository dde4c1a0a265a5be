use serde::{Deserialize, Serialize};

use super::tab::{TabIdentity, WindowId};

/// Backing state of one tab's indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndicatorState {
    pub noisy: bool,
    pub has_plugins: bool,
    pub muted: bool,
}

impl IndicatorState {
    /// Whether the indicator should be shown in the tab strip at all.
    pub fn is_visible(&self) -> bool {
        self.noisy || self.has_plugins
    }
}

/// Icon drawn by the chrome indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorIcon {
    Noisy,
    NoisyMuted,
    Plugins,
    PluginsMuted,
}

/// What the chrome draws for an indicator. Derived from `IndicatorState` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorVisual {
    pub collapsed: bool,
    pub icon: Option<IndicatorIcon>,
    /// Explicit fill; `None` inherits the tab label colour.
    pub fill: Option<String>,
    pub classes: Vec<String>,
    pub tooltip_key: Option<String>,
}

/// Attributes mirrored onto a tab's close button so its styling tracks the tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseButtonAttrs {
    pub pinned: bool,
    pub selected: bool,
    pub visually_selected: bool,
}

/// One tab row as shipped to sidebar views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRecord {
    pub id: TabIdentity,
    pub icon: Option<String>,
    pub title: String,
    pub muted: bool,
    pub noisy: bool,
    pub has_plugins: bool,
}

/// The indicator-bearing tabs of one window, in strip order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub window: WindowId,
    pub tabs: Vec<TabRecord>,
}
