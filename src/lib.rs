//! TallyChain - a minimal append-only balance ledger
//!
//! # Architecture
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the chain, account state and chain validation
//! - [`transaction`] - Transfer transactions and the validity rule
//! - [`crypto`] - Canonical content hashing (SHA-256)
//!
//! ## Participants
//! - [`mempool`] - Pending transactions and block assembly
//! - [`node`] - An in-process node that accepts or rejects incoming blocks
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod crypto;
pub mod transaction;

// ============================================================================
// Participants
// ============================================================================
pub mod mempool;
pub mod node;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;

pub use blockchain::{validate_block, validate_chain, Block, BlockContents, Chain, StateStore};
pub use error::{ChainError, ValidationError};
pub use transaction::{AccountId, Transaction};
