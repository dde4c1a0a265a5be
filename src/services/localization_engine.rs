use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::types::errors::LocaleError;

/// Supported locales.
const SUPPORTED_LOCALES: &[&str] = &["en", "de"];

/// Default locale when system locale is not supported.
const DEFAULT_LOCALE: &str = "en";

/// English strings compiled in, so lookups work without a locales directory.
const BUILTIN_EN: &str = include_str!("../../locales/en.json");

/// Trait defining the localization engine interface.
pub trait LocalizationEngineTrait {
    fn initialize(&mut self) -> Result<(), LocaleError>;
    fn set_locale(&mut self, lang: &str) -> Result<(), LocaleError>;
    fn get_locale(&self) -> &str;
    fn t(&self, key: &str, params: Option<&HashMap<String, String>>) -> String;
    fn detect_system_locale(&self) -> String;
    fn get_available_locales(&self) -> Vec<String>;
}

/// String lookup by dotted key for the add-on's user-facing text.
pub struct LocalizationEngine {
    current_locale: String,
    /// Loaded locale data: maps locale name to its parsed JSON value.
    locales: HashMap<String, Value>,
    locales_dir: PathBuf,
}

impl LocalizationEngine {
    /// Creates an engine with the built-in English strings loaded.
    pub fn new(locales_dir: impl Into<PathBuf>) -> Self {
        let mut locales = HashMap::new();
        if let Ok(builtin) = serde_json::from_str::<Value>(BUILTIN_EN) {
            locales.insert(DEFAULT_LOCALE.to_string(), builtin);
        }
        Self {
            current_locale: DEFAULT_LOCALE.to_string(),
            locales,
            locales_dir: locales_dir.into(),
        }
    }

    /// Looks up a nested key in a JSON value using dot notation.
    /// For example, "sidebar.title" looks up `value["sidebar"]["title"]`.
    fn lookup_key<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
        let mut current = data;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Replaces `{param_name}` placeholders in a string with values from the params map.
    fn interpolate(template: &str, params: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in params {
            let placeholder = format!("{{{}}}", key);
            result = result.replace(&placeholder, value);
        }
        result
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<String> {
        let data = self.locales.get(locale)?;
        Self::lookup_key(data, key)?.as_str().map(str::to_string)
    }
}

impl Default for LocalizationEngine {
    fn default() -> Self {
        Self::new("locales")
    }
}

impl LocalizationEngineTrait for LocalizationEngine {
    /// Loads every supported locale file found in the locales directory.
    /// Files on disk replace the built-in strings.
    fn initialize(&mut self) -> Result<(), LocaleError> {
        let dir = &self.locales_dir;

        if !dir.exists() {
            return Err(LocaleError::FileNotFound(
                dir.to_string_lossy().to_string(),
            ));
        }

        for locale in SUPPORTED_LOCALES {
            let file_path = dir.join(format!("{}.json", locale));
            if !file_path.exists() {
                continue;
            }
            let content = fs::read_to_string(&file_path).map_err(|e| {
                LocaleError::FileNotFound(format!("{}: {}", file_path.to_string_lossy(), e))
            })?;
            let data: Value = serde_json::from_str(&content).map_err(|e| {
                LocaleError::FileNotFound(format!(
                    "Failed to parse {}: {}",
                    file_path.to_string_lossy(),
                    e
                ))
            })?;
            self.locales.insert(locale.to_string(), data);
        }

        Ok(())
    }

    fn set_locale(&mut self, lang: &str) -> Result<(), LocaleError> {
        if !SUPPORTED_LOCALES.contains(&lang) {
            return Err(LocaleError::UnsupportedLocale(lang.to_string()));
        }
        if !self.locales.contains_key(lang) {
            return Err(LocaleError::FileNotFound(format!(
                "Locale '{}' not loaded",
                lang
            )));
        }
        self.current_locale = lang.to_string();
        Ok(())
    }

    fn get_locale(&self) -> &str {
        &self.current_locale
    }

    /// Looks up a key in the current locale, falling back to English and then
    /// to the key itself.
    fn t(&self, key: &str, params: Option<&HashMap<String, String>>) -> String {
        let text = match self
            .lookup(&self.current_locale, key)
            .or_else(|| self.lookup(DEFAULT_LOCALE, key))
        {
            Some(text) => text,
            None => return key.to_string(),
        };

        match params {
            Some(p) => Self::interpolate(&text, p),
            None => text,
        }
    }

    /// Reads the language code from `LANG` (e.g. "de_DE.UTF-8" → "de"),
    /// falling back to English.
    fn detect_system_locale(&self) -> String {
        let lang = std::env::var("LANG").unwrap_or_default();
        let lang_code = lang
            .split('_')
            .next()
            .unwrap_or("")
            .split('.')
            .next()
            .unwrap_or("");

        if SUPPORTED_LOCALES.contains(&lang_code) {
            lang_code.to_string()
        } else {
            DEFAULT_LOCALE.to_string()
        }
    }

    fn get_available_locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.locales.keys().cloned().collect();
        locales.sort();
        locales
    }
}
