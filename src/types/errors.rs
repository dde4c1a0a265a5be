use std::fmt;

// === TabError ===

/// Errors related to window and tab bookkeeping.
#[derive(Debug)]
pub enum TabError {
    /// Tab with the given ID was not found.
    NotFound(String),
    /// Window with the given ID was not found.
    WindowNotFound(String),
    /// The provided tab index is out of bounds.
    InvalidIndex(usize),
}

impl fmt::Display for TabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabError::NotFound(id) => write!(f, "Tab not found: {}", id),
            TabError::WindowNotFound(id) => write!(f, "Window not found: {}", id),
            TabError::InvalidIndex(index) => write!(f, "Invalid tab index: {}", index),
        }
    }
}

impl std::error::Error for TabError {}

// === ProtocolError ===

/// Errors raised while validating messages at a context boundary.
#[derive(Debug)]
pub enum ProtocolError {
    /// The message name is not part of the protocol.
    UnknownMessage(String),
    /// The message payload does not have the expected shape.
    InvalidPayload { message: String, reason: String },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnknownMessage(name) => write!(f, "Unknown message: {}", name),
            ProtocolError::InvalidPayload { message, reason } => {
                write!(f, "Invalid payload for {}: {}", message, reason)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

// === PreferenceError ===

/// Errors related to preference storage.
#[derive(Debug)]
pub enum PreferenceError {
    /// An I/O error occurred while reading or writing preferences.
    IoError(String),
    /// Failed to serialize or deserialize preferences.
    SerializationError(String),
    /// The provided preference key is invalid.
    InvalidKey(String),
    /// The provided preference value is invalid.
    InvalidValue(String),
}

impl fmt::Display for PreferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceError::IoError(msg) => write!(f, "Preferences I/O error: {}", msg),
            PreferenceError::SerializationError(msg) => {
                write!(f, "Preferences serialization error: {}", msg)
            }
            PreferenceError::InvalidKey(key) => write!(f, "Invalid preference key: {}", key),
            PreferenceError::InvalidValue(msg) => {
                write!(f, "Invalid preference value: {}", msg)
            }
        }
    }
}

impl std::error::Error for PreferenceError {}

// === ThemeError ===

/// Errors related to indicator theming.
#[derive(Debug)]
pub enum ThemeError {
    /// The provided color value is invalid.
    InvalidColor(String),
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeError::InvalidColor(color) => write!(f, "Invalid color: {}", color),
        }
    }
}

impl std::error::Error for ThemeError {}

// === LocaleError ===

/// Errors related to localization lookups.
#[derive(Debug)]
pub enum LocaleError {
    /// The requested locale is not supported.
    UnsupportedLocale(String),
    /// The locale file could not be read or parsed.
    FileNotFound(String),
}

impl fmt::Display for LocaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocaleError::UnsupportedLocale(locale) => {
                write!(f, "Unsupported locale: {}", locale)
            }
            LocaleError::FileNotFound(path) => write!(f, "Locale file not found: {}", path),
        }
    }
}

impl std::error::Error for LocaleError {}

// === ReminderError ===

/// Errors from the idle service backing the donation reminder.
#[derive(Debug)]
pub enum ReminderError {
    /// The idle observer could not be registered.
    ObserverRegistration(String),
    /// The idle observer could not be removed (absent or already removed).
    ObserverRemoval(String),
}

impl fmt::Display for ReminderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderError::ObserverRegistration(msg) => {
                write!(f, "Failed to add idle observer: {}", msg)
            }
            ReminderError::ObserverRemoval(msg) => {
                write!(f, "Failed to remove idle observer: {}", msg)
            }
        }
    }
}

impl std::error::Error for ReminderError {}
