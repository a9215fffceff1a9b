//! Server configuration
//!
//! Read from `settings.yaml` in the data directory. A missing or malformed
//! file yields defaults; `PORT` and `CALM_TOOLS_DATA_DIR` override the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::Locale;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3002;

/// Default SQLite file name, relative to the data directory
pub const DEFAULT_DATABASE_FILE: &str = "calm-tools.db";

/// Config file name
const CONFIG_FILENAME: &str = "settings.yaml";

/// Environment variable overriding the port
pub const PORT_ENV: &str = "PORT";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "CALM_TOOLS_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_file")]
    pub database_file: String,
    /// Directory holding `breath.html` / `grounding.html`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_dir: Option<PathBuf>,
    #[serde(default)]
    pub default_locale: Locale,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_database_file() -> String {
    DEFAULT_DATABASE_FILE.to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_file: default_database_file(),
            ui_dir: None,
            default_locale: Locale::default(),
            log_filter: default_log_filter(),
        }
    }
}

/// Where a loaded config came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// No config file; defaults
    Defaults,
    File,
    /// File present but unusable; defaults
    Fallback(String),
}

impl ConfigSource {
    /// Log how the config was obtained
    pub fn report(&self, config_path: &Path) {
        match self {
            Self::Defaults => {
                tracing::debug!(path = %config_path.display(), "No config file, using defaults")
            }
            Self::File => tracing::info!(path = %config_path.display(), "Loaded config"),
            Self::Fallback(reason) => tracing::warn!(
                path = %config_path.display(),
                error = %reason,
                "Ignoring unusable config, using defaults"
            ),
        }
    }
}

impl ServerConfig {
    /// Load the config from `config_dir`, falling back to defaults
    pub fn load(config_dir: &Path) -> Self {
        let (config, source) = Self::read(config_dir);
        source.report(&Self::config_path(config_dir));
        config
    }

    /// Read the config without logging, reporting where it came from
    ///
    /// Lets callers load settings before a log subscriber exists.
    pub fn read(config_dir: &Path) -> (Self, ConfigSource) {
        let config_path = Self::config_path(config_dir);

        if !config_path.exists() {
            return (Self::default(), ConfigSource::Defaults);
        }

        let parsed = fs::read_to_string(&config_path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_yaml::from_str::<Self>(&content).map_err(|e| e.to_string()));
        match parsed {
            Ok(config) => (config, ConfigSource::File),
            Err(reason) => (Self::default(), ConfigSource::Fallback(reason)),
        }
    }

    /// Save the config into `config_dir`
    pub fn save(&self, config_dir: &Path) -> Result<(), String> {
        let config_path = config_dir.join(CONFIG_FILENAME);

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&config_path, content)
            .map_err(|e| format!("Failed to write config file: {}", e))
    }

    /// Apply a `PORT` override
    ///
    /// Values that do not parse are ignored with a warning.
    pub fn with_port_override(mut self, value: Option<&str>) -> Self {
        if let Some(value) = value {
            match value.trim().parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!(value, "Ignoring invalid {}", PORT_ENV),
            }
        }
        self
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        let port = std::env::var(PORT_ENV).ok();
        self.with_port_override(port.as_deref())
    }

    /// Validate a port
    ///
    /// Port 0 asks the OS for a free port; otherwise it must be unprivileged.
    pub fn validate_port(port: u16) -> Result<(), String> {
        if port != 0 && port < 1024 {
            return Err("Port must be >= 1024 (non-privileged ports)".to_string());
        }
        Ok(())
    }

    /// Full path of the SQLite file
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.database_file)
    }

    pub fn config_path(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILENAME)
    }
}

/// Data directory: `CALM_TOOLS_DATA_DIR`, else the platform data dir
pub fn resolve_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("calm-tools")
}
