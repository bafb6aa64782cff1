//! Pending transactions and block assembly

use crate::blockchain::StateStore;
use crate::transaction::Transaction;
use std::collections::VecDeque;
use tracing::warn;

/// Transactions waiting to be put into a block, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Mempool {
    pending: VecDeque<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transaction(&mut self, tx: Transaction) {
        self.pending.push_back(tx);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take up to `block_size_limit` transactions that are valid in sequence
    /// on top of `state`. Transactions that are invalid at their turn are
    /// dropped from the pool. Returns the batch and the state after it.
    pub fn assemble(&mut self, state: &StateStore, block_size_limit: usize) -> (Vec<Transaction>, StateStore) {
        let mut batch = Vec::new();
        let mut working = state.clone();

        while batch.len() < block_size_limit {
            let tx = match self.pending.pop_front() {
                Some(tx) => tx,
                None => break,
            };
            if tx.is_valid(&working) {
                working = tx.apply(&working);
                batch.push(tx);
            } else {
                warn!("Ignored transaction {}", tx);
            }
        }

        (batch, working)
    }
}

impl FromIterator<Transaction> for Mempool {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Mempool {
            pending: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_respects_limit() {
        let state: StateStore = [("Alice", 50), ("Bob", 50)].into_iter().collect();
        let mut pool: Mempool = (0..7).map(|_| Transaction::transfer("Alice", "Bob", 1)).collect();

        let (batch, after) = pool.assemble(&state, 5);
        assert_eq!(batch.len(), 5);
        assert_eq!(after.get("Bob"), 55);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_assemble_drops_invalid_in_sequence() {
        let state: StateStore = [("Alice", 3), ("Bob", 0)].into_iter().collect();
        let mut pool: Mempool = vec![
            Transaction::transfer("Alice", "Bob", 3),
            // Alice is empty by now.
            Transaction::transfer("Alice", "Bob", 1),
            Transaction::transfer("Bob", "Alice", 2),
        ]
        .into_iter()
        .collect();

        let (batch, after) = pool.assemble(&state, 10);
        assert_eq!(batch.len(), 2);
        assert_eq!(after.get("Alice"), 2);
        assert_eq!(after.get("Bob"), 1);
        assert!(pool.is_empty());
        assert_eq!(state.get("Alice"), 3);
    }
}
