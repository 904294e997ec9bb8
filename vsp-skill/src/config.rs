//! vsp-skill configuration
//!
//! Merges the bootstrap TOML with command-line and environment overrides.
//! clap resolves argument-versus-environment precedence before values get
//! here; anything still unset falls back to the TOML file and then to
//! compiled defaults.

use crate::error::Result;
use std::path::{Path, PathBuf};
use vsp_common::config::{resolve_config_path, CardConfig, SigningConfig, TomlConfig};

/// Values supplied on the command line or through `VSP_*` variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub signing_base_url: Option<String>,
    pub signing_secret: Option<String>,
    pub log_level: Option<String>,
}

/// Effective configuration of one skill process
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    pub catalog_path: PathBuf,
    pub signing: SigningConfig,
    pub card: CardConfig,
    pub log_level: String,
    /// TOML file the configuration came from, if any
    pub source: Option<PathBuf>,
}

impl Config {
    /// Resolve and load the TOML file, then apply `overrides`
    pub fn load(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let source = resolve_config_path(config_path);
        let toml = TomlConfig::load(source.as_deref())?;
        Ok(Self::merge(toml, source, overrides))
    }

    pub fn merge(toml: TomlConfig, source: Option<PathBuf>, overrides: ConfigOverrides) -> Self {
        let mut signing = toml.signing;
        if let Some(base_url) = overrides.signing_base_url {
            signing.base_url = base_url;
        }
        if let Some(secret) = overrides.signing_secret {
            signing.secret = secret;
        }

        Self {
            port: overrides.port.unwrap_or(toml.port),
            database_path: overrides.database_path.unwrap_or(toml.database_path),
            catalog_path: overrides.catalog_path.unwrap_or(toml.catalog_path),
            signing,
            card: toml.card,
            log_level: overrides.log_level.unwrap_or(toml.logging.level),
            source,
        }
    }
}
