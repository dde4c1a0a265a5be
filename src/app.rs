//! App Core for Noise Control.
//!
//! Holds the coordinator and its collaborators, and implements the add-on
//! lifecycle. Hosts that play the prober and sidebar roles themselves (the RPC
//! server, the demo) get their command and update channels buffered here and
//! drain them with the `poll_*` methods.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::managers::coordinator::Coordinator;
use crate::managers::indicator_registry::SessionId;
use crate::services::donation_reminder::{DonationReminder, LoadReason, ManualIdleService, ReminderNotification};
use crate::services::localization_engine::{LocalizationEngine, LocalizationEngineTrait};
use crate::services::preference_store::{PreferenceStore, PreferenceStoreTrait};
use crate::types::errors::{PreferenceError, TabError};
use crate::types::protocol::{ProberCommand, SidebarMessage};
use crate::types::settings::PreferenceChange;
use crate::types::tab::{TabIdentity, WindowId};
use crate::ui::sidebar_view::SidebarView;

/// Why the add-on is being unloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnloadReason {
    Shutdown,
    Disable,
    Uninstall,
    Upgrade,
    Downgrade,
}

struct HostedSidebar {
    updates: mpsc::UnboundedReceiver<SidebarMessage>,
    view: SidebarView,
}

/// Central application struct holding the coordinator and its collaborators.
pub struct NoiseControl {
    pub coordinator: Coordinator,
    pub prefs: PreferenceStore,
    pub localization: LocalizationEngine,
    pub reminder: DonationReminder,
    hosted_probers: HashMap<TabIdentity, mpsc::UnboundedReceiver<ProberCommand>>,
    hosted_sidebars: HashMap<SessionId, HostedSidebar>,
    pref_changes: Option<mpsc::UnboundedReceiver<PreferenceChange>>,
}

/// Current Unix time in seconds.
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

impl NoiseControl {
    pub fn new(prefs_path: Option<String>, locales_dir: &str) -> Self {
        Self {
            coordinator: Coordinator::new(),
            prefs: PreferenceStore::new(prefs_path),
            localization: LocalizationEngine::new(locales_dir),
            reminder: DonationReminder::new(
                Box::new(ManualIdleService::default()),
                env!("CARGO_PKG_VERSION"),
            ),
            hosted_probers: HashMap::new(),
            hosted_sidebars: HashMap::new(),
            pref_changes: None,
        }
    }

    /// Startup sequence: load preferences and strings, apply the indicator
    /// colour, subscribe to preference changes, arm the reminder.
    pub fn startup(&mut self, reason: LoadReason, now: i64) {
        let prefs = match self.prefs.load() {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "using default preferences");
                self.prefs.get_prefs().clone()
            }
        };

        if let Err(e) = self.localization.initialize() {
            info!(error = %e, "using built-in strings");
        }
        let locale = self.localization.detect_system_locale();
        let _ = self.localization.set_locale(&locale);

        let _ = self.coordinator.set_indicator_colour(&prefs.indicator.colour);
        self.pref_changes = Some(self.prefs.subscribe());

        self.reminder.arm(reason, prefs.donationreminder, now);
        info!(?reason, "noise control started");
    }

    /// Shutdown sequence. On browser shutdown nothing needs undoing; otherwise
    /// probers are disabled, sessions dropped and indicators removed.
    pub fn shutdown(&mut self, reason: UnloadReason) {
        if reason == UnloadReason::Shutdown {
            return;
        }
        self.pref_changes = None;
        self.reminder.disarm();
        self.coordinator.dispose();
        self.hosted_sidebars.clear();
        self.hosted_probers.clear();
        info!(?reason, "noise control unloaded");
    }

    // ─── Preferences ───

    pub fn set_pref(&mut self, key: &str, value: serde_json::Value) -> Result<(), PreferenceError> {
        self.prefs.set_value(key, value)?;
        self.apply_pref_changes();
        Ok(())
    }

    /// Applies preference changes announced since the last call.
    pub fn apply_pref_changes(&mut self) {
        let rx = match self.pref_changes.as_mut() {
            Some(rx) => rx,
            None => return,
        };
        let mut colour = None;
        while let Ok(change) = rx.try_recv() {
            if change.key == "indicator.colour" {
                colour = change.value.as_str().map(str::to_string);
            }
        }
        if let Some(colour) = colour {
            let _ = self.coordinator.set_indicator_colour(&colour);
        }
    }

    // ─── Hosted probers ───

    /// Opens a tab whose prober commands are buffered for the host.
    pub fn open_tab(&mut self, window: &WindowId, url: Option<&str>) -> Result<TabIdentity, TabError> {
        let tab = self.coordinator.open_tab(window, url, true)?;
        let (tx, rx) = mpsc::unbounded_channel();
        if self.coordinator.link_prober(tab.clone(), tx) {
            self.hosted_probers.insert(tab.clone(), rx);
        }
        Ok(tab)
    }

    /// Closes a window and drops the buffered prober channels of its tabs.
    pub fn close_window(&mut self, window: &WindowId) -> Result<(), TabError> {
        let closed = self.coordinator.close_window(window)?;
        for tab in &closed {
            self.hosted_probers.remove(tab);
        }
        Ok(())
    }

    pub fn close_tab(&mut self, tab: &TabIdentity) -> Result<(), TabError> {
        self.coordinator.close_tab(tab)?;
        self.hosted_probers.remove(tab);
        Ok(())
    }

    /// Drains commands the registry sent to a hosted tab's prober.
    pub fn poll_prober(&mut self, tab: &TabIdentity) -> Vec<ProberCommand> {
        let mut out = Vec::new();
        if let Some(rx) = self.hosted_probers.get_mut(tab) {
            while let Ok(command) = rx.try_recv() {
                out.push(command);
            }
        }
        out
    }

    pub fn hosted_prober_count(&self) -> usize {
        self.hosted_probers.len()
    }

    // ─── Hosted sidebars ───

    pub fn sidebar_title(&self) -> String {
        self.localization.t("sidebar.title", None)
    }

    /// Attaches a sidebar view hosted in-process. The view is synced
    /// immediately from the attach snapshot.
    pub fn attach_sidebar(&mut self) -> SessionId {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = self.coordinator.attach_sidebar(tx);
        if self.coordinator.registry.is_disposed() {
            return session;
        }
        let view = SidebarView::new(self.localization.t("sidebar.mutelabel", None));
        self.hosted_sidebars.insert(session, HostedSidebar { updates: rx, view });
        self.poll_sidebar(&session);
        session
    }

    pub fn detach_sidebar(&mut self, session: &SessionId) -> bool {
        self.hosted_sidebars.remove(session);
        self.coordinator.detach_sidebar(session)
    }

    /// Applies pending registry updates to a hosted view and returns them.
    pub fn poll_sidebar(&mut self, session: &SessionId) -> Vec<SidebarMessage> {
        let mut out = Vec::new();
        if let Some(hosted) = self.hosted_sidebars.get_mut(session) {
            while let Ok(message) = hosted.updates.try_recv() {
                hosted.view.apply(&message);
                out.push(message);
            }
        }
        out
    }

    pub fn sidebar_view(&self, session: &SessionId) -> Option<&SidebarView> {
        self.hosted_sidebars.get(session).map(|h| &h.view)
    }

    /// A click on a hosted view's checkbox. The resulting intent goes to the
    /// registry; the view changes once its update is polled.
    pub fn click_sidebar_mute(&mut self, session: &SessionId, tab: &TabIdentity, checked: bool) -> bool {
        let intent = match self.hosted_sidebars.get(session).and_then(|h| h.view.click_mute(tab, checked)) {
            Some(intent) => intent,
            None => return false,
        };
        self.coordinator.sidebar_intent(intent);
        true
    }

    // ─── Reminder ───

    /// The host reports that the user went idle.
    pub fn idle(&mut self, now: i64) -> Option<ReminderNotification> {
        self.reminder.observe(&self.localization, &mut self.prefs, now)
    }
}
