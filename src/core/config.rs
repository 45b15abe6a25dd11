//! Configuration module for the theme picker
//!
//! Supports loading configuration from a TOML file.
//! Configuration is stored in a standard location:
//! - Windows: %APPDATA%\theme_picker\config.toml
//! - Linux: ~/.config/theme_picker/config.toml
//! - macOS: ~/Library/Application Support/theme_picker/config.toml

use crate::palette::generator::HarmonyScheme;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application name used for config and data directories
const APP_NAME: &str = "theme_picker";

/// Default config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default storage file name
const STORAGE_FILE_NAME: &str = "storage.json";

/// Get the standard configuration directory for the application.
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

/// Get the standard configuration file path.
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Get the default location of the key-value storage file.
///
/// Falls back to the current directory when no data directory is known.
pub fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_NAME).join(STORAGE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(STORAGE_FILE_NAME))
}

/// Ensure the configuration directory exists.
pub fn ensure_config_dir() -> Result<PathBuf, ConfigError> {
    let config_dir = get_config_dir().ok_or(ConfigError::ConfigDirNotFound)?;

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .map_err(|e| ConfigError::WriteError(config_dir.clone(), e.to_string()))?;
    }

    Ok(config_dir)
}

/// Initialize the configuration file if it doesn't exist.
///
/// Returns the path to the config file.
pub fn init_config() -> Result<PathBuf, ConfigError> {
    let config_dir = ensure_config_dir()?;
    let config_path = config_dir.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        fs::write(&config_path, Config::generate_default_config())
            .map_err(|e| ConfigError::WriteError(config_path.clone(), e.to_string()))?;
    }

    Ok(config_path)
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage settings
    pub storage: StorageConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Palette extraction and generation settings
    pub palette: PaletteConfig,

    /// Accessibility audit settings
    pub audit: AuditConfig,

    /// Message bus settings
    pub messaging: MessagingConfig,
}

/// Where themes and palettes are persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the JSON key-value file
    pub path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log to file
    pub log_to_file: bool,

    /// Log file path
    pub log_file: PathBuf,
}

/// Palette configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Number of colors extracted from an image region
    pub default_colors: usize,

    /// Scheme shown when no scheme is requested
    pub default_scheme: HarmonyScheme,
}

/// Accessibility audit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Include passing combinations in the printed report
    pub show_passing: bool,
}

/// Message bus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Reply timeout in milliseconds (0 = wait forever)
    pub timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
            log_file: PathBuf::from("./theme_picker.log"),
        }
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            default_colors: 5,
            default_scheme: HarmonyScheme::Complementary,
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { show_passing: true }
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

impl MessagingConfig {
    /// Reply timeout, `None` when waiting forever
    pub fn timeout(&self) -> Option<std::time::Duration> {
        if self.timeout_ms == 0 {
            None
        } else {
            Some(std::time::Duration::from_millis(self.timeout_ms))
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;

        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ParseError(_, msg) => ConfigError::ParseError(path.to_path_buf(), msg),
            other => other,
        })
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(PathBuf::new(), e.to_string()))
    }

    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./config.toml
    /// 2. ./theme_picker.toml
    /// 3. Standard config location
    ///
    /// If no config file is found, returns default configuration.
    pub fn load_default() -> Result<Self, ConfigError> {
        let local_paths = [
            PathBuf::from("./config.toml"),
            PathBuf::from("./theme_picker.toml"),
        ];

        for path in &local_paths {
            if path.exists() {
                return Self::load(path);
            }
        }

        if let Some(config_path) = get_config_path() {
            if config_path.exists() {
                return Self::load(&config_path);
            }
        }

        Ok(Self::default())
    }

    /// Get the path where the config file is (or would be) located.
    pub fn get_active_config_path() -> PathBuf {
        let local_paths = [
            PathBuf::from("./config.toml"),
            PathBuf::from("./theme_picker.toml"),
        ];

        for path in &local_paths {
            if path.exists() {
                return path.clone();
            }
        }

        get_config_path().unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(path.as_ref(), content)
            .map_err(|e| ConfigError::WriteError(path.as_ref().to_path_buf(), e.to_string()))?;

        Ok(())
    }

    /// Generate a default config file with comments
    pub fn generate_default_config() -> String {
        include_str!("../../config.example.toml").to_string()
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file was not found at the specified path
    FileNotFound(PathBuf),
    /// Failed to read the configuration file
    ReadError(PathBuf, String),
    /// Failed to parse the configuration file (invalid TOML)
    ParseError(PathBuf, String),
    /// Failed to serialize configuration to TOML
    SerializeError(String),
    /// Failed to write configuration file
    WriteError(PathBuf, String),
    /// Could not determine config directory
    ConfigDirNotFound,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ReadError(path, err) => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    err
                )
            }
            ConfigError::ParseError(path, err) => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    err
                )
            }
            ConfigError::SerializeError(err) => {
                write!(f, "Failed to serialize configuration: {}", err)
            }
            ConfigError::WriteError(path, err) => {
                write!(
                    f,
                    "Failed to write config file '{}': {}",
                    path.display(),
                    err
                )
            }
            ConfigError::ConfigDirNotFound => {
                write!(f, "Could not determine configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.log_to_file);
        assert_eq!(config.palette.default_colors, 5);
        assert_eq!(config.palette.default_scheme, HarmonyScheme::Complementary);
        assert_eq!(config.messaging.timeout_ms, 5000);
    }

    #[test]
    fn test_example_config_parses() {
        let config = Config::from_toml(&Config::generate_default_config()).unwrap();
        assert_eq!(config.palette.default_colors, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [palette]
            default_colors = 8
            default_scheme = "triadic"
            "#,
        )
        .unwrap();
        assert_eq!(config.palette.default_colors, 8);
        assert_eq!(config.palette.default_scheme, HarmonyScheme::Triadic);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result = Config::from_toml("[palette\ndefault_colors = ");
        assert!(matches!(result, Err(ConfigError::ParseError(_, _))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/theme_picker/config.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.storage.path = temp_dir.path().join("store.json");
        config.messaging.timeout_ms = 250;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.storage.path, temp_dir.path().join("store.json"));
        assert_eq!(loaded.messaging.timeout_ms, 250);
    }

    #[test]
    fn test_messaging_timeout_zero_means_forever() {
        let config = MessagingConfig { timeout_ms: 0 };
        assert!(config.timeout().is_none());
        let config = MessagingConfig { timeout_ms: 20 };
        assert_eq!(config.timeout(), Some(std::time::Duration::from_millis(20)));
    }
}
