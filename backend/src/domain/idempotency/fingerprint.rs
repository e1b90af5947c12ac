//! Canonical hashing of transactions bound to a token.

use std::fmt;

use sha2::{Digest, Sha256};

/// Errors raised while fingerprinting a transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FingerprintError {
    #[error("fingerprint must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("failed to serialise canonical transaction: {message}")]
    Serialization { message: String },
}

/// SHA-256 of a canonicalised transaction.
///
/// Two deliveries under one token are the same request only when their
/// fingerprints match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionFingerprint([u8; 32]);

impl TransactionFingerprint {
    /// Rebuild a fingerprint from stored bytes.
    ///
    /// # Errors
    /// Fails unless the slice is exactly 32 bytes long.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, FingerprintError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| FingerprintError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for TransactionFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Serialise `value` with recursively sorted object keys and hash it.
///
/// # Examples
/// ```
/// use booking::domain::fingerprint;
/// use serde_json::json;
///
/// let a = fingerprint(&json!({"b": 2, "a": 1})).expect("hash a");
/// let b = fingerprint(&json!({"a": 1, "b": 2})).expect("hash b");
/// assert_eq!(a, b);
/// ```
pub fn fingerprint(value: &serde_json::Value) -> Result<TransactionFingerprint, FingerprintError> {
    let bytes =
        serde_json::to_vec(&canonicalize(value)).map_err(|err| FingerprintError::Serialization {
            message: err.to_string(),
        })?;
    Ok(TransactionFingerprint(Sha256::digest(&bytes).into()))
}

fn canonicalize(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by_key(|(k, _)| k.as_str());
            serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect(),
            )
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(canonicalize).collect())
        }
        other => other.clone(),
    }
}
