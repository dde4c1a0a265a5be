//! Indicator Registry — the single source of truth for per-tab audio state.
//!
//! The registry owns one `Indicator` per tab that has reported noise or
//! plugins, the command channel of every live prober, and the outbound channel
//! of every attached sidebar session. It never blocks: all cross-context
//! traffic is fire-and-forget over unbounded channels, and anything addressed
//! to a closed tab or a detached session is dropped.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::managers::tab_manager::TabDirectory;
use crate::services::theme_engine::IndicatorTheme;
use crate::types::indicator::{CloseButtonAttrs, IndicatorState, IndicatorVisual, TabRecord, WindowSnapshot};
use crate::types::protocol::{ProberCommand, ProberMessage, SidebarMessage};
use crate::types::tab::{Tab, TabIdentity};
use crate::ui::indicator_render::{close_button_attrs, render_indicator};

/// Sending half of a prober's command channel.
pub type ProberSender = mpsc::UnboundedSender<ProberCommand>;

/// Sending half of a sidebar session's update channel.
pub type SidebarSender = mpsc::UnboundedSender<SidebarMessage>;

/// Identifier of one attached sidebar view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-tab indicator: backing state plus what the chrome currently draws.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub state: IndicatorState,
    pub visual: IndicatorVisual,
    pub close_button: Option<CloseButtonAttrs>,
}

impl Indicator {
    fn new(theme: &IndicatorTheme) -> Self {
        let state = IndicatorState::default();
        Self {
            visual: render_indicator(&state, theme),
            state,
            close_button: None,
        }
    }

    fn rerender(&mut self, theme: &IndicatorTheme) {
        self.visual = render_indicator(&self.state, theme);
    }
}

/// Builds the sidebar row for a tab.
fn tab_record(tab: &Tab, state: &IndicatorState) -> TabRecord {
    TabRecord {
        id: tab.id.clone(),
        icon: tab.favicon.clone(),
        title: tab.title.clone(),
        muted: state.muted,
        noisy: state.noisy,
        has_plugins: state.has_plugins,
    }
}

/// Process-wide indicator state, owned by the coordinator context.
pub struct IndicatorRegistry {
    indicators: HashMap<TabIdentity, Indicator>,
    probers: HashMap<TabIdentity, ProberSender>,
    retired: HashSet<TabIdentity>,
    sessions: HashMap<SessionId, SidebarSender>,
    theme: IndicatorTheme,
    disposed: bool,
}

impl IndicatorRegistry {
    pub fn new(theme: IndicatorTheme) -> Self {
        Self {
            indicators: HashMap::new(),
            probers: HashMap::new(),
            retired: HashSet::new(),
            sessions: HashMap::new(),
            theme,
            disposed: false,
        }
    }

    fn accepts(&self, tab: &TabIdentity) -> bool {
        if self.disposed {
            debug!(%tab, "registry disposed, dropping message");
            return false;
        }
        if self.retired.contains(tab) {
            debug!(%tab, "tab retired, dropping message");
            return false;
        }
        true
    }

    // ─── Probers ───

    /// Links a tab's prober. Returns false if the tab is already retired.
    pub fn register_prober(&mut self, tab: TabIdentity, sender: ProberSender) -> bool {
        if !self.accepts(&tab) {
            return false;
        }
        self.probers.insert(tab, sender);
        true
    }

    fn send_to_prober(&mut self, tab: &TabIdentity, command: ProberCommand) {
        let gone = match self.probers.get(tab) {
            Some(sender) => sender.send(command).is_err(),
            None => {
                debug!(%tab, ?command, "no prober linked");
                false
            }
        };
        if gone {
            debug!(%tab, "prober channel closed, unlinking");
            self.probers.remove(tab);
        }
    }

    /// Applies one prober report to the tab's indicator.
    ///
    /// Noise and plugin reports create the indicator on first sight; unload and
    /// unmute reports never do. Replaying a report leaves the state unchanged
    /// and sends nothing.
    pub fn on_prober_event(&mut self, dir: &dyn TabDirectory, tab: &TabIdentity, message: ProberMessage) {
        if !self.accepts(tab) {
            return;
        }
        if dir.tab(tab).is_none() {
            debug!(%tab, ?message, "report for unknown tab");
            return;
        }

        match message {
            ProberMessage::HasNoise(noisy) => {
                if self.update_state(dir, tab, |s| s.noisy = noisy) {
                    self.broadcast_everything(dir);
                }
            }
            ProberMessage::HasPlugins(has_plugins) => {
                if self.update_state(dir, tab, |s| s.has_plugins = has_plugins) {
                    self.broadcast_everything(dir);
                }
            }
            ProberMessage::Unloaded => {
                if self.on_unload(tab) {
                    self.broadcast_everything(dir);
                }
            }
            ProberMessage::Unmuted => {
                let changed = match self.indicators.get_mut(tab) {
                    Some(indicator) if indicator.state.muted => {
                        indicator.state.muted = false;
                        indicator.rerender(&self.theme);
                        true
                    }
                    _ => false,
                };
                if changed {
                    self.broadcast_tab(dir, tab);
                }
            }
            ProberMessage::PluginUiUpdated => {
                self.send_to_prober(tab, ProberCommand::CheckPlugins);
            }
        }
    }

    /// Mutates (creating if needed) a tab's state. Returns whether it changed.
    fn update_state<F>(&mut self, dir: &dyn TabDirectory, tab: &TabIdentity, apply: F) -> bool
    where
        F: FnOnce(&mut IndicatorState),
    {
        let theme = &self.theme;
        let indicator = self.indicators.entry(tab.clone()).or_insert_with(|| {
            debug!(%tab, "creating indicator");
            let mut indicator = Indicator::new(theme);
            indicator.close_button = dir.tab(tab).and_then(close_button_attrs);
            indicator
        });
        let before = indicator.state;
        apply(&mut indicator.state);
        indicator.rerender(theme);
        indicator.state != before
    }

    /// Clears every flag of a tab whose page went away. The indicator object
    /// itself stays while the tab exists. Returns whether anything changed.
    pub fn on_unload(&mut self, tab: &TabIdentity) -> bool {
        if !self.accepts(tab) {
            return false;
        }
        match self.indicators.get_mut(tab) {
            Some(indicator) => {
                let before = indicator.state;
                indicator.state = IndicatorState::default();
                indicator.rerender(&self.theme);
                indicator.state != before
            }
            None => false,
        }
    }

    /// Destroys the tab's indicator and retires its identity for good.
    pub fn on_tab_closed(&mut self, dir: &dyn TabDirectory, tab: &TabIdentity) {
        if !self.accepts(tab) {
            return;
        }
        self.probers.remove(tab);
        self.retired.insert(tab.clone());
        if self.indicators.remove(tab).is_some() {
            debug!(%tab, "indicator destroyed");
            self.broadcast_everything(dir);
        }
    }

    /// Asks the prober of a tab that moved in the strip to re-report noise.
    pub fn on_tab_moved(&mut self, tab: &TabIdentity) {
        if !self.accepts(tab) {
            return;
        }
        self.send_to_prober(tab, ProberCommand::CheckNoise);
    }

    /// Re-mirrors pinned/selected attributes onto the tab's close button.
    pub fn on_tab_attrs_changed(&mut self, dir: &dyn TabDirectory, tab: &TabIdentity) {
        if !self.accepts(tab) {
            return;
        }
        if let Some(indicator) = self.indicators.get_mut(tab) {
            indicator.close_button = dir.tab(tab).and_then(close_button_attrs);
        }
    }

    /// Pushes a tab's new title or favicon to every sidebar listing it.
    pub fn on_tab_metadata_changed(&mut self, dir: &dyn TabDirectory, tab: &TabIdentity) {
        if !self.accepts(tab) {
            return;
        }
        let listed = self.indicators.get(tab).map(|i| i.state.is_visible()).unwrap_or(false);
        if listed {
            self.broadcast_tab(dir, tab);
        }
    }

    // ─── User intent ───

    /// Sets the tab's mute state on behalf of the user, forwards it to the
    /// prober and fans it out to every sidebar.
    ///
    /// An unset `muted` or a tab that no longer exists is a no-op.
    pub fn on_user_toggle(&mut self, dir: &dyn TabDirectory, tab: &TabIdentity, muted: Option<bool>) {
        let muted = match muted {
            Some(m) => m,
            None => return,
        };
        if !self.accepts(tab) {
            return;
        }
        if dir.tab(tab).is_none() {
            debug!(%tab, "toggle for unknown tab ignored");
            return;
        }

        self.update_state(dir, tab, |s| s.muted = muted);
        info!(%tab, muted, "mute toggled");
        self.send_to_prober(tab, ProberCommand::Mute(muted));
        self.broadcast_tab(dir, tab);
    }

    /// Handles a click on the chrome indicator: flips the current mute state.
    pub fn on_indicator_click(&mut self, dir: &dyn TabDirectory, tab: &TabIdentity) {
        let muted = self.indicators.get(tab).map(|i| i.state.muted).unwrap_or(false);
        self.on_user_toggle(dir, tab, Some(!muted));
    }

    // ─── Sidebar sessions ───

    /// Full state across every open window, front-most window first, tabs in
    /// strip order. Only tabs with a visible indicator are included.
    pub fn snapshot_all(&self, dir: &dyn TabDirectory) -> Vec<WindowSnapshot> {
        dir.windows()
            .into_iter()
            .map(|window| {
                let tabs = dir
                    .tabs_in_window(&window)
                    .into_iter()
                    .filter_map(|tab| {
                        self.indicators
                            .get(&tab.id)
                            .filter(|i| i.state.is_visible())
                            .map(|i| tab_record(tab, &i.state))
                    })
                    .collect();
                WindowSnapshot { window, tabs }
            })
            .collect()
    }

    /// Registers a sidebar session and sends it the full snapshot. A disposed
    /// registry hands out an id but keeps no session.
    pub fn attach_sidebar(&mut self, dir: &dyn TabDirectory, sender: SidebarSender) -> SessionId {
        let id = SessionId::generate();
        if self.disposed {
            debug!(session = %id, "attach after dispose ignored");
            return id;
        }
        if sender.send(SidebarMessage::Everything(self.snapshot_all(dir))).is_err() {
            debug!(session = %id, "sidebar went away during attach");
            return id;
        }
        info!(session = %id, "sidebar attached");
        self.sessions.insert(id, sender);
        id
    }

    /// Removes a session. Returns false if it was not attached.
    pub fn detach_sidebar(&mut self, id: &SessionId) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            info!(session = %id, "sidebar detached");
        }
        removed
    }

    /// Sends a message to every session attached right now. Sessions whose
    /// receiver is gone are detached without affecting the others.
    pub fn broadcast(&mut self, message: SidebarMessage) {
        let mut gone = Vec::new();
        for (id, sender) in &self.sessions {
            if sender.send(message.clone()).is_err() {
                gone.push(*id);
            }
        }
        for id in gone {
            debug!(session = %id, "sidebar receiver dropped, detaching");
            self.sessions.remove(&id);
        }
    }

    fn broadcast_everything(&mut self, dir: &dyn TabDirectory) {
        if self.sessions.is_empty() {
            return;
        }
        let snapshot = self.snapshot_all(dir);
        self.broadcast(SidebarMessage::Everything(snapshot));
    }

    fn broadcast_tab(&mut self, dir: &dyn TabDirectory, tab: &TabIdentity) {
        let record = match (dir.tab(tab), self.indicators.get(tab)) {
            (Some(t), Some(indicator)) => tab_record(t, &indicator.state),
            _ => return,
        };
        self.broadcast(SidebarMessage::TabChanged(record));
    }

    // ─── Theming ───

    /// Swaps the theme and re-renders every indicator from its state.
    pub fn set_theme(&mut self, theme: IndicatorTheme) {
        self.theme = theme;
        for indicator in self.indicators.values_mut() {
            indicator.rerender(&self.theme);
        }
    }

    // ─── Queries ───

    pub fn get(&self, tab: &TabIdentity) -> Option<&Indicator> {
        self.indicators.get(tab)
    }

    pub fn indicator_count(&self) -> usize {
        self.indicators.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_retired(&self, tab: &TabIdentity) -> bool {
        self.retired.contains(tab)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ─── Lifecycle ───

    /// Tears down: tells every prober to disable itself, drops all sessions
    /// and indicators. Later events are ignored.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for (tab, sender) in self.probers.drain() {
            if sender.send(ProberCommand::Disable).is_err() {
                debug!(%tab, "prober already gone at dispose");
            }
        }
        self.sessions.clear();
        self.indicators.clear();
        self.disposed = true;
        info!("indicator registry disposed");
    }
}
