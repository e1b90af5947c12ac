//! Transaction token validation and derivation.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Validation errors for [`TransactionToken`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionTokenValidationError {
    #[error("transaction token must not be empty")]
    Empty,
    #[error("transaction token must be at most {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
    #[error("transaction token must contain visible ASCII characters only")]
    InvalidCharacters,
}

/// Opaque token scoping one logical attempt to mutate a booking.
///
/// The store applies a transaction at most once per token inside the
/// retention window. The HTTP layer builds it from the operation name and
/// either the client's `Idempotency-Key` or the server-minted trace id.
///
/// # Examples
/// ```
/// use booking::domain::TransactionToken;
///
/// let token = TransactionToken::new("req-42").expect("valid token");
/// let rollback = token.rollback();
/// assert_ne!(rollback, token);
/// assert_eq!(rollback, token.rollback());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionToken(String);

impl TransactionToken {
    /// Leaves room for an operation prefix in front of a 64-character key.
    pub const MAX_LEN: usize = 80;

    /// Validate and construct a token.
    ///
    /// # Errors
    /// Rejects empty input, input longer than [`Self::MAX_LEN`] and anything
    /// outside visible ASCII (whitespace included).
    pub fn new(token: impl Into<String>) -> Result<Self, TransactionTokenValidationError> {
        let token = token.into();
        if token.is_empty() {
            return Err(TransactionTokenValidationError::Empty);
        }
        if token.len() > Self::MAX_LEN {
            return Err(TransactionTokenValidationError::TooLong {
                max: Self::MAX_LEN,
                actual: token.len(),
            });
        }
        if !token.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(TransactionTokenValidationError::InvalidCharacters);
        }
        Ok(Self(token))
    }

    /// Token for the compensating transaction of this attempt.
    ///
    /// Deterministic, so a replayed compensation collapses onto the first one.
    pub fn rollback(&self) -> Self {
        let digest = Sha256::digest(format!("rollback:{}", self.0).as_bytes());
        let hex = hex::encode(digest);
        Self(format!("rb-{}", &hex[..32]))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for TransactionToken {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TransactionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TransactionToken> for String {
    fn from(value: TransactionToken) -> Self {
        value.0
    }
}

impl TryFrom<String> for TransactionToken {
    type Error = TransactionTokenValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
