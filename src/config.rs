use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ScriptoriumConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub references: ReferenceConfig,
    pub listing: ListingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

/// Cross-reference detection knobs.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Whether `write_topic` scans content when the caller does not say.
    pub detect_by_default: bool,
    /// Names longer than this (in characters) skip the fuzzy pass.
    pub fuzzy_max_name_len: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ListingConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 7411,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_scriptorium_dir()
            .join("knowledge.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            detect_by_default: true,
            fuzzy_max_name_len: 64,
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl ListingConfig {
    /// Resolve a caller-supplied limit against the configured default and ceiling.
    pub fn clamp(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}

/// Returns `~/.scriptorium/`, or `./.scriptorium/` when no home directory is known.
pub fn default_scriptorium_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".scriptorium")
}

/// Returns the default config file path: `~/.scriptorium/config.toml`
pub fn default_config_path() -> PathBuf {
    default_scriptorium_dir().join("config.toml")
}

impl ScriptoriumConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            ScriptoriumConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (SCRIPTORIUM_DB, SCRIPTORIUM_LOG_LEVEL, SCRIPTORIUM_TRANSPORT).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SCRIPTORIUM_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("SCRIPTORIUM_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("SCRIPTORIUM_TRANSPORT") {
            self.server.transport = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
