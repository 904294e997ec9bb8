//! Bootstrap configuration loading
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments (applied by the binary)
//! 2. Environment variables (applied by the binary through clap `env`)
//! 3. TOML configuration file
//! 4. Compiled defaults
//!
//! A missing configuration file is not fatal: the skill logs a warning and
//! starts on compiled defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "VSP_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// SQLite database file holding playback records
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Track catalog file
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    #[serde(default)]
    pub signing: SigningConfig,

    #[serde(default)]
    pub card: CardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Media URL signing parameters
#[derive(Debug, Clone, Deserialize)]
pub struct SigningConfig {
    /// Base URL media keys are appended to
    #[serde(default = "default_signing_base_url")]
    pub base_url: String,

    /// HMAC secret shared with the media host
    #[serde(default)]
    pub secret: String,

    /// Lifetime of a signed URL in seconds
    #[serde(default = "default_expiry_secs")]
    pub expiry_secs: u64,
}

/// Card shown alongside playback and greeting responses
#[derive(Debug, Clone, Deserialize)]
pub struct CardConfig {
    #[serde(default = "default_card_title")]
    pub title: String,
    #[serde(default = "default_card_text")]
    pub text: String,
    #[serde(default = "default_small_image_key")]
    pub small_image_key: String,
    #[serde(default = "default_large_image_key")]
    pub large_image_key: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_port() -> u16 {
    5750
}

fn default_database_path() -> PathBuf {
    default_data_folder().join("vsp.db")
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("catalog.toml")
}

fn default_signing_base_url() -> String {
    "https://media.localhost".to_string()
}

fn default_expiry_secs() -> u64 {
    3600
}

fn default_card_title() -> String {
    "My music".to_string()
}

fn default_card_text() -> String {
    "I like music".to_string()
}

fn default_small_image_key() -> String {
    "Media/Note108.png".to_string()
}

fn default_large_image_key() -> String {
    "Media/Note512.png".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            port: default_port(),
            catalog_path: default_catalog_path(),
            signing: SigningConfig::default(),
            card: CardConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            base_url: default_signing_base_url(),
            secret: String::new(),
            expiry_secs: default_expiry_secs(),
        }
    }
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            title: default_card_title(),
            text: default_card_text(),
            small_image_key: default_small_image_key(),
            large_image_key: default_large_image_key(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration
    ///
    /// An explicitly requested file must exist and parse. With no file
    /// resolved, compiled defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            warn!("No configuration file found, using compiled defaults");
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded TOML configuration from {}", path.display());
        Ok(config)
    }
}

/// Locate the configuration file
///
/// Priority: command-line argument, then `VSP_CONFIG`, then
/// `~/.config/vsp/config.toml`, then `/etc/vsp/config.toml`.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join("vsp").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/vsp/config.toml");
    if system_config.exists() {
        return Some(system_config);
    }

    None
}

/// OS-dependent folder for the database when none is configured
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("vsp"))
        .unwrap_or_else(|| PathBuf::from("./vsp_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.port, 5750);
        assert_eq!(config.catalog_path, PathBuf::from("catalog.toml"));
        assert_eq!(config.signing.expiry_secs, 3600);
        assert!(config.signing.secret.is_empty());
        assert_eq!(config.card.title, "My music");
        assert_eq!(config.logging.level, "info");
        assert!(config.database_path.ends_with("vsp.db"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            port = 6000

            [signing]
            secret = "s3cret"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 6000);
        assert_eq!(config.signing.secret, "s3cret");
        assert_eq!(config.signing.base_url, "https://media.localhost");
        assert_eq!(config.card.large_image_key, "Media/Note512.png");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = TomlConfig::load(None).unwrap();
        assert_eq!(config.port, 5750);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let result = TomlConfig::load(Some(Path::new("/nonexistent/vsp/config.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
