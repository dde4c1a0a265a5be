// Noise Control Preference Store
// Loads, saves and updates add-on preferences, and notifies subscribers of changes.
// Preferences are stored as a JSON file at the platform-specific config path.

use std::fs;
use std::path::Path;

use tokio::sync::mpsc;
use tracing::debug;

use crate::platform;
use crate::types::errors::PreferenceError;
use crate::types::settings::{NoiseControlPrefs, PreferenceChange};

/// Trait defining the preference store interface.
pub trait PreferenceStoreTrait {
    fn load(&mut self) -> Result<NoiseControlPrefs, PreferenceError>;
    fn save(&self) -> Result<(), PreferenceError>;
    fn get_prefs(&self) -> &NoiseControlPrefs;
    fn get_value(&self, key: &str) -> Option<serde_json::Value>;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), PreferenceError>;
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<PreferenceChange>;
    fn get_config_path(&self) -> &str;
}

/// Preference store that persists preferences as JSON on disk.
pub struct PreferenceStore {
    config_path: String,
    prefs: NoiseControlPrefs,
    subscribers: Vec<mpsc::UnboundedSender<PreferenceChange>>,
}

impl PreferenceStore {
    /// Creates a new PreferenceStore.
    ///
    /// If `path_override` is `Some`, uses that path for the preferences file.
    /// Otherwise, uses the platform-specific config directory with `prefs.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("prefs.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            prefs: NoiseControlPrefs::default(),
            subscribers: Vec::new(),
        }
    }

    fn notify(&mut self, key: &str, value: &serde_json::Value) {
        let change = PreferenceChange {
            key: key.to_string(),
            value: value.clone(),
        };
        self.subscribers.retain(|s| s.send(change.clone()).is_ok());
        debug!(key, subscribers = self.subscribers.len(), "preference changed");
    }
}

impl PreferenceStoreTrait for PreferenceStore {
    /// Loads preferences from the JSON file.
    ///
    /// If the file does not exist, returns defaults.
    /// If the file exists but is malformed, returns a serialization error.
    fn load(&mut self) -> Result<NoiseControlPrefs, PreferenceError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            self.prefs = NoiseControlPrefs::default();
            return Ok(self.prefs.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| PreferenceError::IoError(format!("Failed to read prefs file: {}", e)))?;

        let prefs: NoiseControlPrefs = serde_json::from_str(&content).map_err(|e| {
            PreferenceError::SerializationError(format!("Failed to parse prefs file: {}", e))
        })?;

        self.prefs = prefs;
        Ok(self.prefs.clone())
    }

    /// Saves the current preferences, creating parent directories as needed.
    fn save(&self) -> Result<(), PreferenceError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PreferenceError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.prefs).map_err(|e| {
            PreferenceError::SerializationError(format!("Failed to serialize prefs: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| PreferenceError::IoError(format!("Failed to write prefs file: {}", e)))?;

        Ok(())
    }

    fn get_prefs(&self) -> &NoiseControlPrefs {
        &self.prefs
    }

    /// Reads one preference by dot-notation key, e.g. `"indicator.colour"`.
    fn get_value(&self, key: &str) -> Option<serde_json::Value> {
        let json_value = serde_json::to_value(&self.prefs).ok()?;
        let mut current = &json_value;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current.clone())
    }

    /// Updates one preference by dot-notation key path.
    ///
    /// The new value is validated by deserializing the whole preference tree,
    /// then persisted and announced to subscribers.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), PreferenceError> {
        if key.is_empty() {
            return Err(PreferenceError::InvalidKey("Key cannot be empty".to_string()));
        }

        let parts: Vec<&str> = key.split('.').collect();

        let mut json_value = serde_json::to_value(&self.prefs).map_err(|e| {
            PreferenceError::SerializationError(format!("Failed to serialize prefs: {}", e))
        })?;

        {
            let mut current = &mut json_value;
            for (i, part) in parts.iter().enumerate() {
                if i == parts.len() - 1 {
                    match current {
                        serde_json::Value::Object(map) => {
                            if !map.contains_key(*part) {
                                return Err(PreferenceError::InvalidKey(format!(
                                    "Key '{}' not found in prefs",
                                    key
                                )));
                            }
                            map.insert(part.to_string(), value.clone());
                        }
                        _ => {
                            return Err(PreferenceError::InvalidKey(format!(
                                "Cannot navigate to key '{}': intermediate value is not an object",
                                key
                            )));
                        }
                    }
                } else {
                    current = match current.get_mut(*part) {
                        Some(v) => v,
                        None => {
                            return Err(PreferenceError::InvalidKey(format!(
                                "Key '{}' not found in prefs",
                                key
                            )));
                        }
                    };
                }
            }
        }

        let new_prefs: NoiseControlPrefs = serde_json::from_value(json_value).map_err(|e| {
            PreferenceError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;

        self.prefs = new_prefs;
        self.save()?;
        self.notify(key, &value);

        Ok(())
    }

    /// Returns a receiver that gets every subsequent change.
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<PreferenceChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
