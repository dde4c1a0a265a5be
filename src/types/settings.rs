use serde::{Deserialize, Serialize};

/// Preference value meaning "inherit the tab label colour".
pub const CURRENT_COLOR: &str = "currentcolor";

/// Persisted add-on preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoiseControlPrefs {
    pub indicator: IndicatorPrefs,
    /// Unix seconds of the last donation reminder, 0 if never shown.
    pub donationreminder: i64,
}

impl Default for NoiseControlPrefs {
    fn default() -> Self {
        Self {
            indicator: IndicatorPrefs::default(),
            donationreminder: 0,
        }
    }
}

/// Indicator appearance preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorPrefs {
    pub colour: String,
}

impl Default for IndicatorPrefs {
    fn default() -> Self {
        Self {
            colour: CURRENT_COLOR.to_string(),
        }
    }
}

/// A change notification sent to preference subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceChange {
    pub key: String,
    pub value: serde_json::Value,
}
