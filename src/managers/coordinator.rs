//! Coordinator — the registry together with the chrome state it reads.
//!
//! Chrome events (tab opened, closed, moved, pinned) first update the tab
//! manager and are then handed to the registry with the tab manager passed in
//! explicitly. Both the synchronous app and the async registry service drive
//! the registry through this type.

use tracing::warn;

use crate::managers::indicator_registry::{
    Indicator, IndicatorRegistry, ProberSender, SessionId, SidebarSender,
};
use crate::managers::tab_manager::{TabDirectory, TabManager, TabManagerTrait};
use crate::services::theme_engine::{ThemeEngine, ThemeEngineTrait};
use crate::types::errors::{TabError, ThemeError};
use crate::types::indicator::WindowSnapshot;
use crate::types::protocol::{ProberMessage, SidebarIntent};
use crate::types::tab::{TabIdentity, WindowId};

pub struct Coordinator {
    pub registry: IndicatorRegistry,
    pub tabs: TabManager,
    pub theme: ThemeEngine,
}

impl Coordinator {
    pub fn new() -> Self {
        let theme = ThemeEngine::new();
        Self {
            registry: IndicatorRegistry::new(theme.theme()),
            tabs: TabManager::new(),
            theme,
        }
    }

    // ─── Chrome events ───

    pub fn open_window(&mut self) -> WindowId {
        self.tabs.open_window()
    }

    pub fn open_tab(&mut self, window: &WindowId, url: Option<&str>, active: bool) -> Result<TabIdentity, TabError> {
        let tab = self.tabs.create_tab(window, url, active)?;
        self.refresh_window_attrs(window);
        Ok(tab)
    }

    pub fn close_tab(&mut self, tab: &TabIdentity) -> Result<(), TabError> {
        let window = self.tabs.tab(tab).map(|t| t.window.clone());
        self.tabs.close_tab(tab)?;
        self.registry.on_tab_closed(&self.tabs, tab);
        if let Some(window) = window {
            self.refresh_window_attrs(&window);
        }
        Ok(())
    }

    /// Closes a window and every tab in it. Returns the closed tabs.
    pub fn close_window(&mut self, window: &WindowId) -> Result<Vec<TabIdentity>, TabError> {
        let closed = self.tabs.close_window(window)?;
        for tab in &closed {
            self.registry.on_tab_closed(&self.tabs, tab);
        }
        Ok(closed)
    }

    pub fn focus_window(&mut self, window: &WindowId) -> Result<(), TabError> {
        self.tabs.focus_window(window)
    }

    pub fn move_tab(&mut self, tab: &TabIdentity, index: usize) -> Result<(), TabError> {
        self.tabs.reorder_tab(tab, index)?;
        self.registry.on_tab_moved(tab);
        Ok(())
    }

    pub fn set_pinned(&mut self, tab: &TabIdentity, pinned: bool) -> Result<(), TabError> {
        if pinned {
            self.tabs.pin_tab(tab)?;
        } else {
            self.tabs.unpin_tab(tab)?;
        }
        self.registry.on_tab_attrs_changed(&self.tabs, tab);
        Ok(())
    }

    pub fn select_tab(&mut self, tab: &TabIdentity) -> Result<(), TabError> {
        self.tabs.switch_tab(tab)?;
        if let Some(window) = self.tabs.tab(tab).map(|t| t.window.clone()) {
            self.refresh_window_attrs(&window);
        }
        Ok(())
    }

    pub fn set_tab_metadata(&mut self, tab: &TabIdentity, title: Option<&str>, favicon: Option<Option<&str>>) -> Result<(), TabError> {
        if let Some(title) = title {
            self.tabs.update_tab_title(tab, title)?;
        }
        if let Some(favicon) = favicon {
            self.tabs.update_tab_favicon(tab, favicon)?;
        }
        self.registry.on_tab_metadata_changed(&self.tabs, tab);
        Ok(())
    }

    /// Selection changes touch every tab of a window.
    fn refresh_window_attrs(&mut self, window: &WindowId) {
        let ids: Vec<TabIdentity> = self
            .tabs
            .tabs_in_window(window)
            .into_iter()
            .map(|t| t.id.clone())
            .collect();
        for id in &ids {
            self.registry.on_tab_attrs_changed(&self.tabs, id);
        }
    }

    // ─── Protocol ───

    pub fn link_prober(&mut self, tab: TabIdentity, commands: ProberSender) -> bool {
        self.registry.register_prober(tab, commands)
    }

    pub fn prober_event(&mut self, tab: &TabIdentity, message: ProberMessage) {
        self.registry.on_prober_event(&self.tabs, tab, message);
    }

    pub fn sidebar_intent(&mut self, intent: SidebarIntent) {
        match intent {
            SidebarIntent::AudioStateChanged { id, state } => {
                self.registry.on_user_toggle(&self.tabs, &id, state);
            }
        }
    }

    pub fn indicator_click(&mut self, tab: &TabIdentity) {
        self.registry.on_indicator_click(&self.tabs, tab);
    }

    pub fn attach_sidebar(&mut self, outbox: SidebarSender) -> SessionId {
        self.registry.attach_sidebar(&self.tabs, outbox)
    }

    pub fn detach_sidebar(&mut self, session: &SessionId) -> bool {
        self.registry.detach_sidebar(session)
    }

    pub fn snapshot(&self) -> Vec<WindowSnapshot> {
        self.registry.snapshot_all(&self.tabs)
    }

    pub fn indicator(&self, tab: &TabIdentity) -> Option<&Indicator> {
        self.registry.get(tab)
    }

    // ─── Theming & lifecycle ───

    /// Applies the `indicator.colour` preference. An invalid colour leaves the
    /// current theme in place.
    pub fn set_indicator_colour(&mut self, colour: &str) -> Result<(), ThemeError> {
        if let Err(e) = self.theme.set_indicator_colour(colour) {
            warn!(error = %e, "ignoring indicator colour");
            return Err(e);
        }
        self.registry.set_theme(self.theme.theme());
        Ok(())
    }

    pub fn dispose(&mut self) {
        self.registry.dispose();
        self.theme.reset();
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}
