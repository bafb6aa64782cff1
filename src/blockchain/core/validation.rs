use crate::error::ValidationError;
use rayon::prelude::*;
use serde_json::Value;
use tracing::debug;

use super::chain::{Block, Chain};
use super::state::StateStore;

/// Check one block against its parent, starting from `state`.
///
/// Transactions are folded first, in list order, so each one is judged
/// against the effects of the ones before it. Then the digest, the block
/// number and the parent link are checked, each with its own error.
/// `state` is never modified; the new state is returned on success.
pub fn validate_block(
    block: &Block,
    parent: &Block,
    state: &StateStore,
) -> Result<StateStore, ValidationError> {
    let block_number = block.contents.block_number;
    let mut next = state.clone();

    for tx in &block.contents.transactions {
        if !tx.is_valid(&next) {
            return Err(ValidationError::InvalidTransaction {
                block_number,
                transaction: tx.clone(),
            });
        }
        next = tx.apply(&next);
    }

    block.check_digest()?;

    if Some(block_number) != parent.contents.block_number.checked_add(1) {
        return Err(ValidationError::BadBlockNumber(block_number));
    }

    if block.contents.parent_digest != Some(parent.digest) {
        return Err(ValidationError::ParentMismatch(block_number));
    }

    debug!(
        "Block {} valid ({} transactions, digest {})",
        block_number,
        block.contents.transactions.len(),
        block.digest_hex()
    );
    Ok(next)
}

/// Where a [`ChainValidator`] is in its walk over a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatorState {
    AtGenesis,
    /// The next block to check is at this index.
    Validating(usize),
    Accepted(StateStore),
    Rejected(ValidationError),
}

impl ValidatorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ValidatorState::Accepted(_) | ValidatorState::Rejected(_))
    }
}

/// Walks a chain from genesis one block per [`step`](Self::step). Reads the
/// chain only; the running balances are private to this validator, so a
/// caller may stop between steps without leaving anything half-updated.
pub struct ChainValidator<'a> {
    blocks: &'a [Block],
    balances: StateStore,
    state: ValidatorState,
}

impl<'a> ChainValidator<'a> {
    pub fn new(chain: &'a Chain) -> Self {
        ChainValidator {
            blocks: chain.blocks(),
            balances: StateStore::new(),
            state: ValidatorState::AtGenesis,
        }
    }

    pub fn state(&self) -> &ValidatorState {
        &self.state
    }

    /// Advance by one block. Does nothing once accepted or rejected.
    pub fn step(&mut self) -> &ValidatorState {
        let next = match self.state {
            ValidatorState::AtGenesis => self.check_genesis(),
            ValidatorState::Validating(index) => self.check_block(index),
            ValidatorState::Accepted(_) | ValidatorState::Rejected(_) => return &self.state,
        };
        self.state = next;
        &self.state
    }

    /// Step until a terminal state.
    pub fn run(mut self) -> Result<StateStore, ValidationError> {
        loop {
            self.step();
            match std::mem::replace(&mut self.state, ValidatorState::AtGenesis) {
                ValidatorState::Accepted(state) => return Ok(state),
                ValidatorState::Rejected(err) => return Err(err),
                pending => self.state = pending,
            }
        }
    }

    fn check_genesis(&mut self) -> ValidatorState {
        let genesis = match self.blocks.first() {
            Some(block) => block,
            None => return ValidatorState::Rejected(ValidationError::EmptyChain),
        };

        self.balances = StateStore::from_genesis(&genesis.contents.transactions);

        if let Err(err) = genesis.check_digest() {
            return ValidatorState::Rejected(err);
        }
        self.advance_to(1)
    }

    fn check_block(&mut self, index: usize) -> ValidatorState {
        let (parent, block) = (&self.blocks[index - 1], &self.blocks[index]);
        match validate_block(block, parent, &self.balances) {
            Ok(next) => {
                self.balances = next;
                self.advance_to(index + 1)
            }
            Err(err) => ValidatorState::Rejected(err),
        }
    }

    fn advance_to(&mut self, index: usize) -> ValidatorState {
        if index < self.blocks.len() {
            ValidatorState::Validating(index)
        } else {
            ValidatorState::Accepted(std::mem::take(&mut self.balances))
        }
    }
}

/// Anything `validate_chain` can start from.
pub enum ChainInput<'a> {
    Native(&'a Chain),
    Json(&'a str),
    Value(&'a Value),
}

impl<'a> From<&'a Chain> for ChainInput<'a> {
    fn from(chain: &'a Chain) -> Self {
        ChainInput::Native(chain)
    }
}

impl<'a> From<&'a str> for ChainInput<'a> {
    fn from(json: &'a str) -> Self {
        ChainInput::Json(json)
    }
}

impl<'a> From<&'a Value> for ChainInput<'a> {
    fn from(value: &'a Value) -> Self {
        ChainInput::Value(value)
    }
}

/// Validate a whole chain and return the balances it leads to.
/// Serialized input that does not parse fails with
/// [`ValidationError::Deserialization`] before any block is looked at.
pub fn validate_chain<'a>(input: impl Into<ChainInput<'a>>) -> Result<StateStore, ValidationError> {
    match input.into() {
        ChainInput::Native(chain) => ChainValidator::new(chain).run(),
        ChainInput::Json(json) => ChainValidator::new(&Chain::from_json(json)?).run(),
        ChainInput::Value(value) => ChainValidator::new(&Chain::from_value(value)?).run(),
    }
}

/// Validate competing next-blocks against the same parent and state.
/// Each candidate is checked independently, in parallel; results keep
/// the order of `candidates`.
pub fn validate_candidates(
    parent: &Block,
    state: &StateStore,
    candidates: &[Block],
) -> Vec<Result<StateStore, ValidationError>> {
    candidates
        .par_iter()
        .map(|candidate| validate_block(candidate, parent, state))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;

    fn genesis_state() -> StateStore {
        [("Alice", 50), ("Bob", 50)].into_iter().collect()
    }

    fn two_block_chain() -> Chain {
        let genesis = Block::genesis(&genesis_state());
        let one = Block::make(vec![Transaction::transfer("Alice", "Bob", 5)], &genesis).unwrap();
        let two = Block::make(vec![Transaction::transfer("Bob", "Alice", 20)], &one).unwrap();
        Chain::from_blocks(vec![genesis, one, two])
    }

    #[test]
    fn test_validator_walks_states_in_order() {
        let chain = two_block_chain();
        let mut validator = ChainValidator::new(&chain);
        assert_eq!(validator.state(), &ValidatorState::AtGenesis);
        assert_eq!(validator.step(), &ValidatorState::Validating(1));
        assert_eq!(validator.step(), &ValidatorState::Validating(2));

        let expected: StateStore = [("Alice", 65), ("Bob", 35)].into_iter().collect();
        assert_eq!(validator.step(), &ValidatorState::Accepted(expected.clone()));
        // Terminal states stay put.
        assert_eq!(validator.step(), &ValidatorState::Accepted(expected));
    }

    #[test]
    fn test_genesis_only_chain_is_accepted() {
        let chain = Chain::new(Block::genesis(&genesis_state()));
        assert_eq!(validate_chain(&chain), Ok(genesis_state()));
    }

    #[test]
    fn test_empty_chain_is_rejected() {
        assert_eq!(validate_chain(&Chain::default()), Err(ValidationError::EmptyChain));
    }

    #[test]
    fn test_genesis_digest_is_checked() {
        let mut genesis = Block::genesis(&genesis_state());
        genesis.contents.transactions[0] = [("Alice", 5000)].into_iter().collect();
        let chain = Chain::new(genesis);
        assert_eq!(validate_chain(&chain), Err(ValidationError::HashMismatch(0)));
    }

    #[test]
    fn test_genesis_entries_skip_the_transaction_rule() {
        // Genesis balances are not deltas; they need not sum to zero.
        let state: StateStore = [("Alice", 7)].into_iter().collect();
        let chain = Chain::new(Block::genesis(&state));
        assert_eq!(validate_chain(&chain), Ok(state));
    }

    #[test]
    fn test_later_transaction_sees_earlier_effects() {
        let genesis = Block::genesis(&genesis_state());
        let block = Block::make(
            vec![
                Transaction::transfer("Alice", "Bob", 50),
                Transaction::transfer("Bob", "Carol", 100),
            ],
            &genesis,
        )
        .unwrap();
        let state = validate_block(&block, &genesis, &genesis_state()).unwrap();
        assert_eq!(state.get("Alice"), 0);
        assert_eq!(state.get("Bob"), 0);
        assert_eq!(state.get("Carol"), 100);
    }

    #[test]
    fn test_invalid_transaction_reported_before_digest() {
        let genesis = Block::genesis(&genesis_state());
        let mut block = Block::make(vec![Transaction::transfer("Alice", "Bob", 100)], &genesis).unwrap();
        block.digest[0] ^= 1;
        let err = validate_block(&block, &genesis, &genesis_state()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTransaction { block_number: 1, .. }));
    }

    #[test]
    fn test_parent_mismatch() {
        let genesis = Block::genesis(&genesis_state());
        let other = Block::genesis(&[("Alice", 1)].into_iter().collect());
        let block = Block::make(vec![], &other).unwrap();
        assert_eq!(
            validate_block(&block, &genesis, &genesis_state()),
            Err(ValidationError::ParentMismatch(1))
        );
    }

    #[test]
    fn test_bad_block_number() {
        let genesis = Block::genesis(&genesis_state());
        let block = Block::seal(crate::blockchain::BlockContents {
            block_number: 0,
            parent_digest: Some(genesis.digest),
            transactions: vec![],
        });
        assert_eq!(
            validate_block(&block, &genesis, &genesis_state()),
            Err(ValidationError::BadBlockNumber(0))
        );
    }

    #[test]
    fn test_candidates_are_judged_independently() {
        let genesis = Block::genesis(&genesis_state());
        let state = genesis_state();
        let candidates = vec![
            Block::make(vec![Transaction::transfer("Alice", "Bob", 10)], &genesis).unwrap(),
            Block::make(vec![Transaction::transfer("Alice", "Bob", 60)], &genesis).unwrap(),
            Block::make(vec![Transaction::transfer("Bob", "Alice", 50)], &genesis).unwrap(),
        ];
        let results = validate_candidates(&genesis, &state, &candidates);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().map(|s| s.get("Bob")), Ok(60));
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().map(|s| s.get("Alice")), Ok(100));
        assert_eq!(state, genesis_state());
    }
}
