use crate::error::{Result, ScheduleError};
use crate::models::Provider;
use crate::status::DEFAULT_AVAILABLE_RATIO;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/providers.toml";
pub const DEFAULT_DELIVERY_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
    #[serde(default)]
    pub providers: Vec<Provider>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default = "default_available_ratio")]
    pub available_ratio: f64,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            available_ratio: DEFAULT_AVAILABLE_RATIO,
            seed: None,
        }
    }
}

fn default_available_ratio() -> f64 {
    DEFAULT_AVAILABLE_RATIO
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingConfig {
    #[serde(default = "default_delivery_delay_ms")]
    pub delivery_delay_ms: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        MessagingConfig {
            delivery_delay_ms: DEFAULT_DELIVERY_DELAY_MS,
        }
    }
}

fn default_delivery_delay_ms() -> u64 {
    DEFAULT_DELIVERY_DELAY_MS
}

impl SchedulerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ScheduleError::Config {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SchedulerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.engine.available_ratio) {
            return Err(ScheduleError::Config {
                message: format!(
                    "engine.availableRatio must be between 0 and 1, got {}",
                    self.engine.available_ratio
                ),
            });
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if !seen.insert(provider.id.as_str()) {
                return Err(ScheduleError::Config {
                    message: format!("Duplicate provider id: {}", provider.id),
                });
            }
            provider.validate().map_err(|e| ScheduleError::Config {
                message: format!("Provider {}: {}", provider.id, e),
            })?;
        }
        Ok(())
    }
}
