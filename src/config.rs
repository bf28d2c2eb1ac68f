use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::app::enrich_use_case::EnrichSettings;
use crate::constants::*;
use crate::error::{Result, SorterError};
use crate::pipeline::throttle::ThrottleLimits;

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub discogs: DiscogsConfig,
    pub throttle: ThrottleConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscogsConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThrottleConfig {
    pub request_ceiling: u32,
    pub cooldown_seconds: u64,
    pub max_attempts: u32,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus listener port; no exporter is installed when unset
    pub port: Option<u16>,
}

impl Default for DiscogsConfig {
    fn default() -> Self {
        Self {
            base_url: DISCOGS_BASE_URL.to_string(),
            user_agent: DISCOGS_USER_AGENT.to_string(),
            timeout_seconds: DISCOGS_TIMEOUT_SECONDS,
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            request_ceiling: REQUEST_CEILING,
            cooldown_seconds: COOLDOWN_SECONDS,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

impl Config {
    /// Load from `path` if given, else from `vinyl-sorter.toml` when present,
    /// else defaults. An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        if let Ok(port) = std::env::var(METRICS_PORT_ENV) {
            let port = port.parse().map_err(|e| {
                SorterError::Config(format!("{} must be a port number: {}", METRICS_PORT_ENV, e))
            })?;
            config.metrics.port = Some(port);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SorterError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.throttle.max_attempts == 0 {
            return Err(SorterError::Config("throttle.max_attempts must be at least 1".into()));
        }
        if self.discogs.base_url.trim().is_empty() {
            return Err(SorterError::Config("discogs.base_url must not be empty".into()));
        }
        Ok(())
    }

    pub fn enrich_settings(&self) -> EnrichSettings {
        EnrichSettings {
            throttle: ThrottleLimits {
                request_ceiling: self.throttle.request_ceiling,
                cooldown_seconds: self.throttle.cooldown_seconds,
            },
            max_attempts: self.throttle.max_attempts,
        }
    }
}
