use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

use crate::domain::DEFAULT_CATALOG;

// ============================================================================
// Simulation Configuration
// ============================================================================
//
// All knobs default to the values of the original hand-run simulation:
// ten orders, one every five seconds, transit legs of one to ten seconds.
// A TOML file can override any subset of fields.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of orders the emitter generates before completing.
    pub order_count: u32,
    /// Pacing between generated orders.
    pub spawn_period_ms: u64,
    /// Lower bound of the randomized per-transition delay.
    pub transition_delay_min_ms: u64,
    /// Upper bound (inclusive) of the randomized per-transition delay.
    pub transition_delay_max_ms: u64,
    /// Product catalog orders draw from; must not be empty.
    pub catalog: Vec<String>,
    /// Optional remote registry to seed initial orders from.
    pub registry_url: Option<String>,
    /// Name filter passed to the registry lookup.
    pub registry_name: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            order_count: 10,
            spawn_period_ms: 5_000,
            transition_delay_min_ms: 1_000,
            transition_delay_max_ms: 10_000,
            catalog: DEFAULT_CATALOG.iter().map(|s| s.to_string()).collect(),
            registry_url: None,
            registry_name: None,
        }
    }
}

impl SimulationConfig {
    /// Read and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.is_empty() {
            return Err(ConfigError::Invalid("catalog must not be empty".into()));
        }
        if self.order_count == 0 {
            return Err(ConfigError::Invalid("order_count must be positive".into()));
        }
        if self.spawn_period_ms == 0 {
            return Err(ConfigError::Invalid("spawn_period_ms must be positive".into()));
        }
        if self.transition_delay_min_ms == 0 {
            return Err(ConfigError::Invalid(
                "transition_delay_min_ms must be positive".into(),
            ));
        }
        if self.transition_delay_min_ms > self.transition_delay_max_ms {
            return Err(ConfigError::Invalid(
                "transition delay bounds are inverted".into(),
            ));
        }
        Ok(())
    }

    /// Inclusive per-transition delay bounds in milliseconds.
    pub fn delay_range(&self) -> RangeInclusive<u64> {
        self.transition_delay_min_ms..=self.transition_delay_max_ms
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
