//! Donation Reminder — one idle-triggered notification after an upgrade.
//!
//! Everything here is best effort: failing to register or remove the idle
//! observer is logged and otherwise ignored.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::services::localization_engine::LocalizationEngineTrait;
use crate::services::preference_store::PreferenceStoreTrait;
use crate::types::errors::ReminderError;

/// Minimum time between two reminders.
pub const REMINDER_INTERVAL_SECS: i64 = 7 * 24 * 60 * 60;

/// Seconds of user inactivity before the reminder is shown.
pub const IDLE_TIMEOUT_SECS: u32 = 12;

pub const NOTIFICATION_ID: &str = "noise-control-donate";

pub const CONTRIBUTE_URL: &str = "https://addons.mozilla.org/addon/noise-control/contribute/installed/";

/// Why the add-on was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadReason {
    Install,
    Enable,
    Startup,
    Upgrade,
    Downgrade,
}

/// Idle notifications from the host.
pub trait IdleService: Send {
    fn add_idle_observer(&mut self, timeout_secs: u32) -> Result<(), ReminderError>;
    fn remove_idle_observer(&mut self, timeout_secs: u32) -> Result<(), ReminderError>;
}

/// Idle service for hosts that report idleness themselves by calling
/// `DonationReminder::observe`.
#[derive(Debug, Default)]
pub struct ManualIdleService {
    observers: Vec<u32>,
}

impl ManualIdleService {
    pub fn is_observing(&self) -> bool {
        !self.observers.is_empty()
    }
}

impl IdleService for ManualIdleService {
    fn add_idle_observer(&mut self, timeout_secs: u32) -> Result<(), ReminderError> {
        self.observers.push(timeout_secs);
        Ok(())
    }

    fn remove_idle_observer(&mut self, timeout_secs: u32) -> Result<(), ReminderError> {
        let pos = self
            .observers
            .iter()
            .position(|t| *t == timeout_secs)
            .ok_or_else(|| ReminderError::ObserverRemoval(format!("no observer for {}s", timeout_secs)))?;
        self.observers.remove(pos);
        Ok(())
    }
}

/// The notification bar content shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderNotification {
    pub id: String,
    pub message: String,
    pub button_label: String,
    pub access_key: String,
    pub url: String,
}

pub struct DonationReminder {
    idle: Box<dyn IdleService>,
    armed: bool,
    version: String,
}

impl DonationReminder {
    pub fn new(idle: Box<dyn IdleService>, version: impl Into<String>) -> Self {
        Self {
            idle,
            armed: false,
            version: version.into(),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Arms the idle observer after an upgrade when the last reminder is more
    /// than a week old. Returns whether the observer is now armed.
    pub fn arm(&mut self, reason: LoadReason, last_reminder_secs: i64, now_secs: i64) -> bool {
        if reason != LoadReason::Upgrade {
            return false;
        }
        if now_secs - last_reminder_secs <= REMINDER_INTERVAL_SECS {
            return false;
        }
        match self.idle.add_idle_observer(IDLE_TIMEOUT_SECS) {
            Ok(()) => {
                self.armed = true;
                debug!("donation reminder armed");
            }
            Err(e) => debug!(error = %e, "donation reminder not armed"),
        }
        self.armed
    }

    /// Removes the idle observer. It might not exist or already be removed.
    pub fn disarm(&mut self) {
        if let Err(e) = self.idle.remove_idle_observer(IDLE_TIMEOUT_SECS) {
            debug!(error = %e, "idle observer already gone");
        }
        self.armed = false;
    }

    /// The user went idle: disarm, record the time and build the notification.
    ///
    /// Returns `None` if the reminder was not armed.
    pub fn observe(
        &mut self,
        locale: &dyn LocalizationEngineTrait,
        prefs: &mut dyn PreferenceStoreTrait,
        now_secs: i64,
    ) -> Option<ReminderNotification> {
        if !self.armed {
            return None;
        }
        self.disarm();

        let mut params = HashMap::new();
        params.insert("version".to_string(), self.version.clone());
        let notification = ReminderNotification {
            id: NOTIFICATION_ID.to_string(),
            message: locale.t("donate.message1", Some(&params)),
            button_label: locale.t("donate.button.label", None),
            access_key: locale.t("donate.button.accesskey", None),
            url: CONTRIBUTE_URL.to_string(),
        };

        if let Err(e) = prefs.set_value("donationreminder", serde_json::json!(now_secs)) {
            warn!(error = %e, "could not record donation reminder time");
        }
        info!("donation reminder shown");
        Some(notification)
    }
}
