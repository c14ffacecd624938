//! Configuration model.

use super::rule::DEFAULT_TIMESTAMP_FORMAT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "BULK_RENAMER_CONFIG";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults for rule flags left unset on the command line.
    pub defaults: RuleDefaults,
    /// Backup behaviour.
    pub backup: BackupConfig,
}

/// Rule defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleDefaults {
    /// First number used by numbering.
    pub numbering_start: u64,
    /// Zero-padding width for numbering.
    pub numbering_padding: usize,
    /// strftime format for the timestamp token.
    pub timestamp_format: String,
}

/// Backup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Verify backup copies by SHA-256 in addition to size.
    pub verify_checksum: bool,
}

impl Default for RuleDefaults {
    fn default() -> Self {
        Self {
            numbering_start: 1,
            numbering_padding: 3,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            verify_checksum: true,
        }
    }
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bulk_renamer")
        .join("config.toml")
}

/// Load configuration from file, falling back to defaults.
pub fn load_config() -> Config {
    load_config_from(&config_path())
}

/// Load configuration from a specific file, falling back to defaults.
pub fn load_config_from(path: &std::path::Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Config::default()
            }
        },
        Err(e) => {
            tracing::warn!("Cannot read config {:?}: {}", path, e);
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.defaults.numbering_start, 1);
        assert_eq!(config.defaults.numbering_padding, 3);
        assert_eq!(config.defaults.timestamp_format, "%Y%m%d%H%M%S");
        assert!(config.backup.verify_checksum);
    }

    #[test]
    fn test_partial_config_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\nnumbering_padding = 5\n").unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.defaults.numbering_padding, 5);
        assert_eq!(config.defaults.numbering_start, 1);
        assert!(config.backup.verify_checksum);
    }

    #[test]
    fn test_malformed_config_falls_back() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[backup\nverify_checksum = ").unwrap();

        let config = load_config_from(&path);
        assert!(config.backup.verify_checksum);
    }

    #[test]
    fn test_missing_config_file() {
        let config = load_config_from(std::path::Path::new("/nonexistent/config.toml"));
        assert_eq!(config.defaults.numbering_padding, 3);
    }
}
