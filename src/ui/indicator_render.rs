//! Pure rendering of chrome indicators.
//!
//! Visuals depend only on the current `IndicatorState` and theme. Rendering the
//! final state directly is indistinguishable from following every incremental
//! update that led to it.

use crate::services::theme_engine::IndicatorTheme;
use crate::types::indicator::{CloseButtonAttrs, IndicatorIcon, IndicatorState, IndicatorVisual};
use crate::types::tab::Tab;

/// Maps indicator state to what the tab strip draws.
pub fn render_indicator(state: &IndicatorState, theme: &IndicatorTheme) -> IndicatorVisual {
    let icon = match (state.noisy, state.has_plugins, state.muted) {
        (true, _, false) => Some(IndicatorIcon::Noisy),
        (true, _, true) => Some(IndicatorIcon::NoisyMuted),
        (false, true, false) => Some(IndicatorIcon::Plugins),
        (false, true, true) => Some(IndicatorIcon::PluginsMuted),
        (false, false, _) => None,
    };

    let mut classes = vec!["tab-icon-image".to_string()];
    if state.noisy {
        classes.push("noisy".to_string());
    }
    if state.has_plugins {
        classes.push("plugins".to_string());
    }
    if state.muted {
        classes.push("muted".to_string());
    }

    let tooltip_key = icon.map(|_| {
        if state.muted {
            "indicator.unmute".to_string()
        } else {
            "indicator.mute".to_string()
        }
    });

    IndicatorVisual {
        collapsed: icon.is_none(),
        icon,
        fill: theme.fill.clone(),
        classes,
        tooltip_key,
    }
}

/// Close-button attributes for a tab, or `None` when the tab has no close button.
pub fn close_button_attrs(tab: &Tab) -> Option<CloseButtonAttrs> {
    if !tab.has_close_button {
        return None;
    }
    Some(CloseButtonAttrs {
        pinned: tab.pinned,
        selected: tab.selected,
        visually_selected: tab.visually_selected,
    })
}
