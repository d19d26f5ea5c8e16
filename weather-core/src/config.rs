use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::provider::ProviderId;

fn default_latency_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    10
}

/// Settings for the built-in sample data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Simulated latency before a fetch resolves.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Fixed seed for record selection; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Number of initial fetches that fail on purpose.
    #[serde(default)]
    pub fail_first: u32,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            seed: None,
            fail_first: 0,
        }
    }
}

/// Settings for a JSON weather endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_provider = "fixture"
/// auto_refresh_secs = 3600
///
/// [fixture]
/// latency_ms = 1000
///
/// [http]
/// url = "http://localhost:8080/weather"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default provider id, "fixture" or "http".
    pub default_provider: Option<String>,

    /// Interval for `weather watch` when no `--every` is given.
    #[serde(default)]
    pub auto_refresh_secs: Option<u64>,

    #[serde(default)]
    pub fixture: FixtureConfig,

    #[serde(default)]
    pub http: Option<HttpConfig>,
}

impl Config {
    /// Return the default provider as a strongly-typed ProviderId.
    /// Falls back to the fixture provider, which needs no setup.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match self.default_provider.as_deref() {
            Some(s) => ProviderId::try_from(s),
            None => Ok(ProviderId::Fixture),
        }
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    pub fn set_http_endpoint(&mut self, http: HttpConfig) {
        self.http = Some(http);
    }

    pub fn is_provider_configured(&self, id: ProviderId) -> bool {
        match id {
            ProviderId::Fixture => true,
            ProviderId::Http => self.http.is_some(),
        }
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
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
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
