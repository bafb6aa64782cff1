use crate::crypto::{hash_value, hex_hash, hex_hash_opt, Sha256Hash};
use crate::error::{ChainError, ValidationError};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::state::StateStore;
use super::validation::validate_block;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockContents {
    pub block_number: u64,
    /// `None` only for genesis.
    #[serde(default, with = "hex_hash_opt")]
    pub parent_digest: Option<Sha256Hash>,
    pub transactions: Vec<Transaction>,
}

impl BlockContents {
    pub fn to_value(&self) -> Value {
        let transactions: Vec<Value> = self.transactions.iter().map(Transaction::to_value).collect();
        json!({
            "blockNumber": self.block_number,
            "parentDigest": self.parent_digest.map(hex::encode),
            "transactions": transactions,
        })
    }

    pub fn digest(&self) -> Sha256Hash {
        hash_value(&self.to_value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(with = "hex_hash")]
    pub digest: Sha256Hash,
    pub contents: BlockContents,
}

impl Block {
    /// Seal `contents` under their own digest.
    pub fn seal(contents: BlockContents) -> Self {
        Block {
            digest: contents.digest(),
            contents,
        }
    }

    /// Block 0: its single entry is the initial balance snapshot.
    pub fn genesis(initial: &StateStore) -> Self {
        Self::seal(BlockContents {
            block_number: 0,
            parent_digest: None,
            transactions: vec![initial.to_snapshot()],
        })
    }

    /// Propose the block that follows `parent`. Transaction order is kept.
    /// Fails when `parent` already carries the last representable number.
    pub fn make(transactions: Vec<Transaction>, parent: &Block) -> Result<Self, ValidationError> {
        let block_number = parent
            .contents
            .block_number
            .checked_add(1)
            .ok_or(ValidationError::BadBlockNumber(parent.contents.block_number))?;
        Ok(Self::seal(BlockContents {
            block_number,
            parent_digest: Some(parent.digest),
            transactions,
        }))
    }

    pub fn number(&self) -> u64 {
        self.contents.block_number
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Recompute the digest and compare; a mismatch is never corrected.
    pub fn check_digest(&self) -> Result<(), ValidationError> {
        if self.contents.digest() != self.digest {
            return Err(ValidationError::HashMismatch(self.contents.block_number));
        }
        Ok(())
    }
}

/// An append-only sequence of blocks; index 0 is genesis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    pub fn new(genesis: Block) -> Self {
        Chain {
            blocks: vec![genesis],
        }
    }

    /// Wrap blocks as-is. Nothing is checked until the chain is validated.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Chain { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn genesis(&self) -> Option<&Block> {
        self.blocks.first()
    }

    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Validate `block` against the tip and `state`, then append it.
    /// On error the chain is left exactly as it was.
    pub fn append(&mut self, block: Block, state: &StateStore) -> Result<StateStore, ValidationError> {
        let parent = self.tip().ok_or(ValidationError::EmptyChain)?;
        let next = validate_block(&block, parent, state)?;
        self.blocks.push(block);
        Ok(next)
    }

    pub fn to_json(&self) -> Result<String, ChainError> {
        serde_json::to_string_pretty(self).map_err(|e| ChainError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        Ok(Chain::deserialize(value)?)
    }
}
