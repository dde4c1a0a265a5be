//! Theme Engine — resolves the `indicator.colour` preference into an indicator fill.

use crate::types::errors::ThemeError;
use crate::types::settings::CURRENT_COLOR;

/// Selector of the indicator icon inside the tab strip.
const INDICATOR_SELECTOR: &str = "svg[anonid=\"noise-indicator\"] > use";

/// Trait defining the theme engine interface.
pub trait ThemeEngineTrait {
    fn set_indicator_colour(&mut self, colour: &str) -> Result<(), ThemeError>;
    fn get_indicator_colour(&self) -> Option<&str>;
    fn theme(&self) -> IndicatorTheme;
    fn colour_rule(&self) -> Option<String>;
    fn reset(&mut self);
}

/// Theme inputs to indicator rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorTheme {
    /// `None` inherits the tab label colour.
    pub fill: Option<String>,
}

/// Validates a hex color string (e.g. "#2ea44f" or "#fff").
fn is_valid_hex_color(color: &str) -> bool {
    if !color.starts_with('#') {
        return false;
    }
    let hex = &color[1..];
    matches!(hex.len(), 3 | 6)
        && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Named CSS colours are plain ASCII words such as "red" or "darkorange".
fn is_named_color(color: &str) -> bool {
    !color.is_empty() && color.len() <= 32 && color.chars().all(|c| c.is_ascii_alphabetic())
}

/// The theme engine implementation.
pub struct ThemeEngine {
    indicator_colour: Option<String>,
}

impl ThemeEngine {
    /// Creates a ThemeEngine that inherits the tab label colour.
    pub fn new() -> Self {
        Self { indicator_colour: None }
    }
}

impl Default for ThemeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeEngineTrait for ThemeEngine {
    /// Applies a preference value. `currentcolor` clears any explicit fill.
    fn set_indicator_colour(&mut self, colour: &str) -> Result<(), ThemeError> {
        let colour = colour.trim();
        if colour.eq_ignore_ascii_case(CURRENT_COLOR) {
            self.indicator_colour = None;
            return Ok(());
        }
        if !is_valid_hex_color(colour) && !is_named_color(colour) {
            return Err(ThemeError::InvalidColor(colour.to_string()));
        }
        self.indicator_colour = Some(colour.to_lowercase());
        Ok(())
    }

    fn get_indicator_colour(&self) -> Option<&str> {
        self.indicator_colour.as_deref()
    }

    fn theme(&self) -> IndicatorTheme {
        IndicatorTheme {
            fill: self.indicator_colour.clone(),
        }
    }

    /// The stylesheet rule injected into each chrome document, if any.
    fn colour_rule(&self) -> Option<String> {
        self.indicator_colour
            .as_ref()
            .map(|c| format!("{} {{ fill: {}; }}", INDICATOR_SELECTOR, c))
    }

    fn reset(&mut self) {
        self.indicator_colour = None;
    }
}
