/// Transaction types for TallyChain
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque account identifier.
pub type AccountId = String;

/// A batch of balance deltas keyed by account. A well-formed transfer
/// conserves value: its deltas sum to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction {
    deltas: BTreeMap<AccountId, i64>,
}

impl Transaction {
    pub fn new(deltas: BTreeMap<AccountId, i64>) -> Self {
        Transaction { deltas }
    }

    /// Move `amount` from one account to another. An amount of `i64::MIN`
    /// cannot be negated and yields a transaction that never balances.
    pub fn transfer(from: &str, to: &str, amount: i64) -> Self {
        let mut deltas = BTreeMap::new();
        let debit = deltas.entry(from.to_string()).or_insert(0i64);
        *debit = debit.wrapping_sub(amount);
        let credit = deltas.entry(to.to_string()).or_insert(0i64);
        *credit = credit.wrapping_add(amount);
        Transaction { deltas }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, i64)> + '_ {
        self.deltas.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Sum of all deltas, widened so it cannot overflow.
    pub fn net(&self) -> i128 {
        self.deltas.values().map(|v| *v as i128).sum()
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.deltas
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::from(*v)))
                .collect(),
        )
    }
}

impl<K: Into<AccountId>> FromIterator<(K, i64)> for Transaction {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Transaction {
            deltas: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", crate::crypto::canonical_json(&self.to_value()))
    }
}
