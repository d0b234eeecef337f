//! Configuration file management for wayfarer.
//!
//! Provides a TOML-based config file at `~/.config/wayfarer/config.toml` and
//! a resolution chain for the API URL: CLI flag > env var > config file >
//! default. The signed-in session is persisted next to it, one file per key
//! under `session/`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use wayfarer_api::{ApiConfig, FileStorage};

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api: ApiSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiSection {
    pub url: String,
    /// Per-request timeout in seconds. Omitted means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the wayfarer config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/wayfarer` or
/// `~/.config/wayfarer`, also on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("wayfarer");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("wayfarer")
}

/// Return the path to the wayfarer config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Directory holding the persisted session keys.
pub fn session_dir() -> PathBuf {
    config_dir().join("session")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct WayfarerConfig {
    pub api_config: ApiConfig,
    pub session_dir: PathBuf,
}

impl WayfarerConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - API URL: `cli_api_url` > `WAYFARER_API_URL` env > `config_file.api.url` > `ApiConfig::DEFAULT_URL`
    /// - Timeout: `config_file.api.timeout_secs`, otherwise none
    ///
    /// A present but malformed config file is an error; a missing one is not.
    pub fn resolve(cli_api_url: Option<&str>) -> Result<Self> {
        let file_config = if config_path().exists() {
            Some(load_config()?)
        } else {
            None
        };

        let url = if let Some(url) = cli_api_url {
            url.to_string()
        } else if let Some(url) = std::env::var(ApiConfig::ENV_VAR)
            .ok()
            .filter(|s| !s.trim().is_empty())
        {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.api.url.clone()
        } else {
            ApiConfig::DEFAULT_URL.to_string()
        };

        let mut api_config = ApiConfig::new(url);
        if let Some(secs) = file_config.as_ref().and_then(|c| c.api.timeout_secs) {
            api_config = api_config.with_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            api_config,
            session_dir: session_dir(),
        })
    }

    pub fn session_storage(&self) -> FileStorage {
        FileStorage::new(&self.session_dir)
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
