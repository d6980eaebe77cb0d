//! Display configuration types
//!
//! The computation itself takes no configuration. These options are consumed
//! by whatever presents the results (the CLI renderer, a GUI) and travel with
//! the library so that every front end agrees on their meaning and defaults.

use serde::{Deserialize, Serialize};

/// How identifiers and numeric facts are rendered as text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    /// `0x` prefixed upper-case hexadecimal
    #[default]
    Hex,
    /// Plain decimal
    Decimal,
}

impl NumberFormat {
    /// Render a number in this format
    pub fn format(self, value: u64) -> String {
        match self {
            NumberFormat::Hex => format!("0x{:X}", value),
            NumberFormat::Decimal => value.to_string(),
        }
    }
}

/// Configuration for presenting frame info results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Whether the rendered fact tree starts fully expanded
    #[serde(default)]
    pub auto_expand: bool,

    /// Number format for identifiers and field values
    #[serde(default)]
    pub number_format: NumberFormat,
}

impl DisplayConfig {
    /// Create a new display configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: start the tree fully expanded
    pub fn with_auto_expand(mut self, enabled: bool) -> Self {
        self.auto_expand = enabled;
        self
    }

    /// Builder method: set the number format
    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = format;
        self
    }

    /// Render a number using the configured format
    pub fn format_number(&self, value: u64) -> String {
        self.number_format.format(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_config_builder() {
        let config = DisplayConfig::new()
            .with_auto_expand(true)
            .with_number_format(NumberFormat::Decimal);

        assert!(config.auto_expand);
        assert_eq!(config.number_format, NumberFormat::Decimal);
        assert_eq!(config.format_number(0x123), "291");
    }

    #[test]
    fn test_defaults() {
        let config = DisplayConfig::new();
        assert!(!config.auto_expand);
        assert_eq!(config.number_format, NumberFormat::Hex);
        assert_eq!(config.format_number(0xFEF1), "0xFEF1");
    }
}
