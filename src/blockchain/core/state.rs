use crate::transaction::{AccountId, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Account balances derived by folding a chain. Owned by whoever ran the
/// validation; `clone` is the only way a new state comes into being.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateStore {
    balances: BTreeMap<AccountId, i64>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a state from genesis entries. Each entry assigns balances
    /// directly; later entries overwrite earlier ones.
    pub fn from_genesis(entries: &[Transaction]) -> Self {
        let mut state = Self::new();
        for entry in entries {
            for (account, balance) in entry.iter() {
                state.assign(account.clone(), balance);
            }
        }
        state
    }

    /// Balance of `account`, zero when it has never been seen.
    pub fn get(&self, account: &str) -> i64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn assign(&mut self, account: AccountId, balance: i64) {
        self.balances.insert(account, balance);
    }

    pub fn total(&self) -> i128 {
        self.balances.values().map(|v| *v as i128).sum()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, i64)> + '_ {
        self.balances.iter().map(|(k, v)| (k, *v))
    }

    /// The genesis snapshot of this state, as a single transaction-shaped entry.
    pub fn to_snapshot(&self) -> Transaction {
        Transaction::new(self.balances.clone())
    }
}

impl<K: Into<AccountId>> FromIterator<(K, i64)> for StateStore {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        StateStore {
            balances: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
