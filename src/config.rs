// src/config.rs
use anyhow::{Context, Result};
use directories_next::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ECHO_URL: &str = "https://api.ipify.org";
pub const DEFAULT_ROUTE_TABLE: &str = "/proc/net/route";

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV: &str = "IP_CONFIG";

// --- LocalConfig struct ---
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LocalConfig {
    /// Interfaces whose name starts with this are hidden unless asked for.
    pub bridge_prefix: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        LocalConfig { bridge_prefix: "bridge".to_string() }
    }
}

// --- GatewayConfig struct ---
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    pub route_table: PathBuf,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig { route_table: PathBuf::from(DEFAULT_ROUTE_TABLE) }
    }
}

// --- ExternalConfig struct ---
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExternalConfig {
    pub url: String,
    pub timeout_ms: u64,
    /// Ignore `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub no_proxy: bool,
}

impl ExternalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ExternalConfig {
    fn default() -> Self {
        ExternalConfig {
            url: DEFAULT_ECHO_URL.to_string(),
            timeout_ms: 5_000,
            no_proxy: false,
        }
    }
}

// --- AppConfig struct ---
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub local: LocalConfig,
    pub gateway: GatewayConfig,
    pub external: ExternalConfig,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(path);
        let config_str = fs::read_to_string(expanded_path.as_ref())
            .context(format!("Failed to read config file: {}", path))?;
        Self::from_toml(&config_str)
            .context(format!("Failed to parse TOML from config file: {}", path))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(config_str)?;
        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        ProjectDirs::from("rs", "ipinfo", "ipinfo")
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Loads an explicitly named file, or the default one if it exists.
    /// Only the default location may be absent.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let default_path = Self::default_path();
        if !default_path.exists() {
            tracing::debug!(path = %default_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let path_str = default_path
            .to_str()
            .context("Config path contains invalid UTF-8")?;
        Self::from_file(path_str)
    }
}
