//! # Luma Configuration System
//!
//! File: cli/src/core/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module loads, merges and validates the settings used by the deploy
//! pipeline: the deployment service base URL, the monitor timeout, the poll
//! interval and the directory build artifacts are written to.
//!
//! ## Architecture
//!
//! Settings are resolved from three sources, in order of precedence:
//! 1. Command-line flags and environment variables (`ConfigOverrides`)
//! 2. The user configuration file (`<config dir>/luma/config.toml`, or the
//!    file named by `LUMA_CONFIG`)
//! 3. Default values defined in the code
//!
//! The merged `DeployConfig` is then turned into `DeploySettings`: paths are
//! expanded (`~`), the URL is parsed, and durations are validated.
//!
//! ## Examples
//!
//! ```toml
//! [deploy]
//! api_url = "https://deploy.example.com/dev"
//! timeout_secs = 600
//! poll_interval_secs = 5
//! build_dir = "~/.cache/luma/builds"
//! ```
//!
//! ```rust
//! let settings = config::load_settings(ConfigOverrides::default())?;
//! println!("Deploying to {}", settings.api_url);
//! ```
//!
use crate::core::error::{LumaError, Result};
use anyhow::anyhow;
use directories::ProjectDirs;
use reqwest::Url;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info, warn};

/// Base URL of the hosted deployment service.
pub const DEFAULT_API_URL: &str = "https://yron03hrwk.execute-api.us-east-1.amazonaws.com/dev";
/// How long the monitor waits for a terminal status (15 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 15 * 60;
/// Delay between two status polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
/// Environment variable naming an alternate configuration file.
pub const CONFIG_PATH_ENV: &str = "LUMA_CONFIG";

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub deploy: DeployConfig,
}

/// The `[deploy]` table of the configuration file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    /// Base URL of the deployment service.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Overall monitor timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Delay between status polls in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Directory for build artifacts (can use ~). Defaults to the OS temp dir.
    #[serde(default)]
    pub build_dir: Option<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            build_dir: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

/// Values supplied on the command line (or via environment variables) that
/// take precedence over the configuration file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
    pub build_dir: Option<PathBuf>,
}

/// Fully resolved settings handed to the deploy pipeline.
#[derive(Debug, Clone)]
pub struct DeploySettings {
    pub api_url: Url,
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub build_dir: PathBuf,
}

impl DeploySettings {
    /// Settings pointing at `api_url` with the default timings and the OS temp dir.
    #[cfg(test)]
    pub fn with_api_url(api_url: Url) -> Self {
        Self {
            api_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            build_dir: env::temp_dir(),
        }
    }
}

/// # Load Deploy Settings (`load_settings`)
///
/// Reads the user configuration file (if any), applies `overrides` on top of
/// it and resolves the result into validated `DeploySettings`.
///
/// ## Errors
///
/// Returns `LumaError::Config` if the configuration file cannot be read or
/// parsed, or if the merged settings fail validation.
pub fn load_settings(overrides: ConfigOverrides) -> Result<DeploySettings> {
    let user_config = load_user_config()?.unwrap_or_default();
    let merged = merge_overrides(user_config.deploy, overrides);
    let settings = resolve_settings(merged)?;
    debug!("Final deploy settings: {:?}", settings);
    Ok(settings)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Ok(explicit) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(shellexpand::tilde(&explicit).into_owned());
        info!("Loading configuration from {}: {}", CONFIG_PATH_ENV, path.display());
        return load_config_from_path(&path).map(Some);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "Luma", "luma") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        LumaError::Config(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;
    let config = toml::from_str(&content).map_err(|e| {
        LumaError::Config(format!(
            "Failed to parse TOML from file {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(config)
}

fn merge_overrides(file: DeployConfig, overrides: ConfigOverrides) -> DeployConfig {
    DeployConfig {
        api_url: overrides.api_url.unwrap_or(file.api_url),
        timeout_secs: overrides.timeout_secs.unwrap_or(file.timeout_secs),
        poll_interval_secs: overrides
            .poll_interval_secs
            .unwrap_or(file.poll_interval_secs),
        build_dir: overrides
            .build_dir
            .map(|p| p.to_string_lossy().into_owned())
            .or(file.build_dir),
    }
}

fn resolve_settings(config: DeployConfig) -> Result<DeploySettings> {
    let api_url = Url::parse(&config.api_url).map_err(|e| {
        anyhow!(LumaError::Config(format!(
            "Invalid api_url '{}': {}",
            config.api_url, e
        )))
    })?;
    if !matches!(api_url.scheme(), "http" | "https") {
        return Err(anyhow!(LumaError::Config(format!(
            "Invalid api_url '{}': expected an http or https URL.",
            config.api_url
        ))));
    }
    if api_url.cannot_be_a_base() {
        return Err(anyhow!(LumaError::Config(format!(
            "Invalid api_url '{}': cannot be used as a base URL.",
            config.api_url
        ))));
    }
    if config.timeout_secs == 0 {
        return Err(anyhow!(LumaError::Config(
            "timeout_secs must be greater than zero.".to_string()
        )));
    }
    if config.poll_interval_secs == 0 {
        return Err(anyhow!(LumaError::Config(
            "poll_interval_secs must be greater than zero.".to_string()
        )));
    }

    let build_dir = match config.build_dir {
        Some(dir) => PathBuf::from(shellexpand::tilde(&dir).into_owned()),
        None => env::temp_dir(),
    };
    if build_dir.exists() && !build_dir.is_dir() {
        return Err(anyhow!(LumaError::Config(format!(
            "Configured build_dir '{}' exists but is not a directory.",
            build_dir.display()
        ))));
    }

    Ok(DeploySettings {
        api_url,
        timeout: Duration::from_secs(config.timeout_secs),
        poll_interval: Duration::from_secs(config.poll_interval_secs),
        build_dir,
    })
}
