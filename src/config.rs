//! Configuration management for TallyChain

use crate::blockchain::StateStore;
use crate::error::{ChainError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "tally.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub genesis: GenesisConfig,
    #[serde(default)]
    pub producer: ProducerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenesisConfig {
    #[serde(default = "default_balances")]
    pub balances: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProducerConfig {
    /// Most transactions a proposed block may carry
    #[serde(default = "default_block_size_limit")]
    pub block_size_limit: usize,
    #[serde(default = "default_transaction_count")]
    pub transaction_count: usize,
    #[serde(default = "default_max_transfer")]
    pub max_transfer: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            balances: default_balances(),
        }
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            block_size_limit: default_block_size_limit(),
            transaction_count: default_transaction_count(),
            max_transfer: default_max_transfer(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Config {
    pub fn genesis_state(&self) -> StateStore {
        self.genesis.balances.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .parse()
            .map_err(|_| ChainError::Config(format!("unknown logging.level '{}'", self.logging.level)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.producer.block_size_limit == 0 {
            return Err(ChainError::Config("producer.block_size_limit must be at least 1".to_string()));
        }
        if self.producer.max_transfer < 1 {
            return Err(ChainError::Config("producer.max_transfer must be at least 1".to_string()));
        }
        if let Some((account, balance)) = self.genesis.balances.iter().find(|(_, v)| **v < 0) {
            return Err(ChainError::Config(format!(
                "genesis balance for {} is negative ({})",
                account, balance
            )));
        }
        self.log_level()?;
        Ok(())
    }
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config = if path.exists() {
        let config_str = fs::read_to_string(path)?;
        toml::from_str(&config_str)?
    } else {
        Config::default()
    };

    config.validate()?;
    Ok(config)
}

fn default_balances() -> BTreeMap<String, i64> {
    BTreeMap::from([("Alice".to_string(), 50), ("Bob".to_string(), 50)])
}

fn default_block_size_limit() -> usize {
    5
}

fn default_transaction_count() -> usize {
    30
}

fn default_max_transfer() -> i64 {
    3
}

fn default_level() -> String {
    "info".to_string()
}
