//! # Value Objects
//!
//! Configuration for the token state layer.

use serde::{Deserialize, Serialize};

use super::errors::ConfigError;

/// Environment variable overriding [`StateConfig::recent_tx_capacity`].
pub const ENV_RECENT_TX_CAPACITY: &str = "TI_RECENT_TX_CAPACITY";

/// Environment variable overriding [`StateConfig::recent_block_capacity`].
pub const ENV_RECENT_BLOCK_CAPACITY: &str = "TI_RECENT_BLOCK_CAPACITY";

/// Configuration for the pipeline's in-memory state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// How many recently processed transaction ids to remember (default: 100,000).
    ///
    /// Must cover the gap between a transaction arriving from the mempool
    /// and arriving again inside a block.
    pub recent_tx_capacity: usize,
    /// How many recently processed block hashes to remember (default: 1,000).
    pub recent_block_capacity: usize,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            recent_tx_capacity: 100_000,
            recent_block_capacity: 1_000,
        }
    }
}

impl StateConfig {
    /// Reject capacities the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recent_tx_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "recent_tx_capacity",
            });
        }
        if self.recent_block_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "recent_block_capacity",
            });
        }
        Ok(())
    }

    /// Defaults overridden by `TI_RECENT_TX_CAPACITY` and
    /// `TI_RECENT_BLOCK_CAPACITY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_RECENT_TX_CAPACITY) {
            config.recent_tx_capacity = parse_capacity(ENV_RECENT_TX_CAPACITY, &value)?;
        }
        if let Some(value) = lookup(ENV_RECENT_BLOCK_CAPACITY) {
            config.recent_block_capacity = parse_capacity(ENV_RECENT_BLOCK_CAPACITY, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Builder-style method to set the transaction window
    pub fn with_recent_tx_capacity(mut self, capacity: usize) -> Self {
        self.recent_tx_capacity = capacity;
        self
    }

    /// Builder-style method to set the block window
    pub fn with_recent_block_capacity(mut self, capacity: usize) -> Self {
        self.recent_block_capacity = capacity;
        self
    }
}

fn parse_capacity(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvValue {
            key,
            value: value.to_string(),
        })
}
