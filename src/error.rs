//! Error types for TallyChain

use crate::transaction::Transaction;
use thiserror::Error;

/// Why a chain or block was rejected. The validator stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Hash does not match contents of block {0}")]
    HashMismatch(u64),
    #[error("Parent hash does not match contents of block {0}")]
    ParentMismatch(u64),
    #[error("Block number {0} does not follow its parent")]
    BadBlockNumber(u64),
    #[error("Invalid transaction in block {block_number}: {transaction}")]
    InvalidTransaction {
        block_number: u64,
        transaction: Transaction,
    },
    #[error("Malformed serialized chain: {0}")]
    Deserialization(String),
    #[error("Chain has no genesis block")]
    EmptyChain,
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Deserialization(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::Config(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
