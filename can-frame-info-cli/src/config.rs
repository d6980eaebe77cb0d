//! Configuration loading and parsing

use anyhow::{Context, Result};
use can_frame_info::{parse_identifier, DisplayConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// Capture files, loaded in order into one history
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// Identifier to show, as typed by a user ("0x123", "291")
    pub id: Option<String>,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate(&config).with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

fn validate(config: &AppConfig) -> Result<()> {
    if let Some(id) = &config.input.id {
        parse_identifier(id)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use can_frame_info::NumberFormat;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            files = ["capture.log", "more.csv"]
            id = "0x18FEF100"

            [display]
            auto_expand = true
            number_format = "decimal"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.files.len(), 2);
        assert_eq!(config.input.id.as_deref(), Some("0x18FEF100"));
        assert!(config.display.auto_expand);
        assert_eq!(config.display.number_format, NumberFormat::Decimal);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.input.files.is_empty());
        assert!(!config.display.auto_expand);
        assert_eq!(config.display.number_format, NumberFormat::Hex);
    }

    #[test]
    fn test_load_rejects_malformed_id() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[input]\nid = \"brake\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Malformed identifier text"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_config(Path::new("no-such-config.toml")).is_err());
    }
}
