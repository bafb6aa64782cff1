use crate::blockchain::{validate_chain, Block, Chain, StateStore};
use crate::error::ValidationError;
use crate::mempool::Mempool;
use crate::transaction::Transaction;
use tracing::{info, warn};

/// An in-process ledger participant. Owns its accepted chain and the
/// balances that chain leads to, and only ever moves both forward together.
#[derive(Debug, Clone)]
pub struct LedgerNode {
    pub name: String,
    chain: Chain,
    state: StateStore,
}

impl LedgerNode {
    /// Start a fresh chain whose genesis block seeds `initial`.
    pub fn new(name: impl Into<String>, initial: &StateStore) -> Self {
        Self {
            name: name.into(),
            chain: Chain::new(Block::genesis(initial)),
            state: initial.clone(),
        }
    }

    /// Adopt an existing chain after validating all of it.
    pub fn from_chain(name: impl Into<String>, chain: Chain) -> Result<Self, ValidationError> {
        let name = name.into();
        let state = validate_chain(&chain)?;
        info!("{}: adopted chain of {} blocks", name, chain.len());
        Ok(Self { name, chain, state })
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn height(&self) -> usize {
        self.chain.len()
    }

    /// Accept a block from elsewhere. On rejection the error is logged and
    /// returned, and the node stays on its last known-good chain and state.
    pub fn receive_block(&mut self, block: Block) -> Result<(), ValidationError> {
        let number = block.number();
        match self.chain.append(block, &self.state) {
            Ok(next) => {
                self.state = next;
                info!("{}: accepted block {} (chain is {} blocks long)", self.name, number, self.chain.len());
                Ok(())
            }
            Err(err) => {
                warn!("{}: invalid block, ignoring and waiting for the next one: {}", self.name, err);
                Err(err)
            }
        }
    }

    /// Build, but do not append, the block that would follow the current tip.
    pub fn propose_block(&self, transactions: Vec<Transaction>) -> Result<Block, ValidationError> {
        let tip = self.chain.tip().ok_or(ValidationError::EmptyChain)?;
        Block::make(transactions, tip)
    }

    /// Assemble a block from `mempool` and append it to this node's chain.
    pub fn produce_block(&mut self, mempool: &mut Mempool, block_size_limit: usize) -> Result<Block, ValidationError> {
        let (batch, _) = mempool.assemble(&self.state, block_size_limit);
        let block = self.propose_block(batch)?;
        self.receive_block(block.clone())?;
        Ok(block)
    }
}
