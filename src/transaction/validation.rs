/// The transaction rule: validity against a balance state, and its effect
use crate::blockchain::StateStore;
use crate::transaction::types::Transaction;

impl Transaction {
    /// A transaction is valid when its deltas sum to exactly zero and no
    /// account it touches ends up below zero (or past `i64::MAX`).
    /// Accounts missing from `state` hold a balance of zero.
    pub fn is_valid(&self, state: &StateStore) -> bool {
        if self.net() != 0 {
            return false;
        }

        // Judge every account; the verdict is the AND over all of them.
        self.iter()
            .map(|(account, delta)| match state.get(account).checked_add(delta) {
                Some(balance) => balance >= 0,
                None => false,
            })
            .fold(true, |all, ok| all && ok)
    }

    /// Return the state after this transaction. Does no checking of its
    /// own: callers must have seen `is_valid` return true.
    pub fn apply(&self, state: &StateStore) -> StateStore {
        let mut next = state.clone();
        for (account, delta) in self.iter() {
            let balance = state.get(account) + delta;
            next.assign(account.clone(), balance);
        }
        next
    }
}
