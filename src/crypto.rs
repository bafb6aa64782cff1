//! Content hashing for TallyChain
//!
//! Every digest in the ledger is SHA-256 over a canonical text encoding.
//! Plain strings are hashed byte-for-byte. Structured values are first
//! rendered with [`canonical_json`]: object keys are sorted
//! lexicographically, array elements keep their order. Reordering the keys
//! of a transaction therefore never changes a digest, while reordering the
//! transactions of a block always does.

use crate::error::ValidationError;
use serde_json::Value;
use sha2::{Digest, Sha256};

pub type Sha256Hash = [u8; 32];

/// Hash raw bytes (used directly for plain strings).
pub fn hash_bytes(bytes: &[u8]) -> Sha256Hash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Hash a structured value through its canonical encoding.
pub fn hash_value(value: &Value) -> Sha256Hash {
    match value {
        Value::String(s) => hash_bytes(s.as_bytes()),
        other => hash_bytes(canonical_json(other).as_bytes()),
    }
}

/// Render a JSON value with sorted object keys and no insignificant whitespace.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // A `Value::String` always serializes.
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Parse a lowercase (or uppercase) hex digest.
pub fn hash_from_hex(hex_str: &str) -> Result<Sha256Hash, ValidationError> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| ValidationError::Deserialization(format!("Invalid hex digest: {}", e)))?;
    if bytes.len() != 32 {
        return Err(ValidationError::Deserialization(format!(
            "Digest must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    bytes.try_into().map_err(|_| {
        ValidationError::Deserialization("Failed to convert bytes into digest".to_string())
    })
}

/// Serde adapter: `Sha256Hash` as a lowercase hex string.
pub mod hex_hash {
    use super::Sha256Hash;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &Sha256Hash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Sha256Hash, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::hash_from_hex(&s).map_err(D::Error::custom)
    }
}

/// Serde adapter: `Option<Sha256Hash>` as a hex string or `null`.
pub mod hex_hash_opt {
    use super::Sha256Hash;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        hash: &Option<Sha256Hash>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match hash {
            Some(hash) => serializer.serialize_some(&hex::encode(hash)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Sha256Hash>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| super::hash_from_hex(&s).map_err(D::Error::custom))
            .transpose()
    }
}
