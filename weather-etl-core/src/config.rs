use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherstack.com";
pub const DEFAULT_LOCATIONS: &str = "Bogota,Medellin,Cali,Barranquilla,Cartagena";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_BASE_URL: &str = "WEATHERSTACK_BASE_URL";
pub const ENV_LOCATIONS: &str = "WEATHER_LOCATIONS";
/// Older name for the location list, read when `WEATHER_LOCATIONS` is unset.
pub const ENV_LOCATIONS_ALIAS: &str = "CIUDADES";
pub const ENV_TIMEOUT: &str = "WEATHER_TIMEOUT_SECS";

/// Where the run writes its artifacts. Paths are relative to the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("data/weather.csv"),
            json_path: PathBuf::from("data/weather.json"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

/// Top-level configuration.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// locations = ["Bogota", "Lima"]
/// timeout_secs = 5
///
/// [output]
/// csv_path = "data/weather.csv"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub locations: Vec<String>,
    pub timeout_secs: u64,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            locations: parse_locations(DEFAULT_LOCATIONS),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-etl", "weather-etl")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override file values with the process environment.
    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// Override file values with whatever `lookup` returns for the known variables.
    /// Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key.trim().to_string());
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url.trim().to_string();
        }
        if let Some(list) = get(ENV_LOCATIONS).or_else(|| get(ENV_LOCATIONS_ALIAS)) {
            self.locations = parse_locations(&list);
        }
        if let Some(raw) = get(ENV_TIMEOUT) {
            self.timeout_secs = parse_timeout(&raw)?;
        }

        Ok(())
    }

    /// Returns the API key, failing before any network call if it is absent.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Checks everything a run needs up front.
    pub fn ensure_runnable(&self) -> Result<(), ConfigError> {
        self.api_key()?;
        if self.locations.is_empty() {
            return Err(ConfigError::NoLocations);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "timeout_secs",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Split a comma-separated location list, trimming names and dropping empty entries.
pub fn parse_locations(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidValue {
            name: ENV_TIMEOUT,
            value: raw.to_string(),
        }),
    }
}
