//! Pagination configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for the pagination controller and the item generator.
///
/// Missing fields fall back to the defaults when deserializing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Items fetched per request
    pub page_size: usize,
    /// Distance from the top, in presentation units, below which an upward
    /// scroll requests more items
    pub trigger_threshold: f64,
    /// Simulated fetch latency for the item generator
    pub latency_ms: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            trigger_threshold: 400.0,
            latency_ms: 500,
        }
    }
}

impl PaginationConfig {
    /// Parse a JSON config and validate it
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        if !self.trigger_threshold.is_finite() || self.trigger_threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.trigger_threshold));
        }
        Ok(())
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}
