//! Public booking identifiers and secret confirmation codes.

use std::fmt;

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Errors raised when parsing identifiers received from clients or storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierValidationError {
    #[error("booking id must be exactly {expected} letters or digits")]
    InvalidBookingId { expected: usize },
    #[error("secret code must be exactly {expected} digits")]
    InvalidSecretCode { expected: usize },
}

/// Identifier shown to the customer in URLs, emails and SMS.
///
/// Twelve characters drawn from `[A-Za-z0-9]`, a URL-safe alphabet. Never
/// derived from the internal storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicBookingId(String);

impl PublicBookingId {
    pub const LEN: usize = 12;

    /// Draw a fresh identifier from `rng`.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let id = rng
            .sample_iter(&Alphanumeric)
            .take(Self::LEN)
            .map(char::from)
            .collect();
        Self(id)
    }

    /// Validate an identifier supplied by a client.
    ///
    /// # Examples
    /// ```
    /// use booking::domain::PublicBookingId;
    ///
    /// assert!(PublicBookingId::parse("Ab3dEf6hIj9L").is_ok());
    /// assert!(PublicBookingId::parse("Ab3dEf6hIj9-").is_err());
    /// assert!(PublicBookingId::parse("short").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, IdentifierValidationError> {
        if raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Ok(Self(raw.to_owned()))
        } else {
            Err(IdentifierValidationError::InvalidBookingId { expected: Self::LEN })
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PublicBookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PublicBookingId> for String {
    fn from(value: PublicBookingId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PublicBookingId {
    type Error = IdentifierValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Six-digit code the customer shows at the entrance.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecretCode(String);

impl SecretCode {
    pub const LEN: usize = 6;

    pub fn generate(rng: &mut impl Rng) -> Self {
        let code = (0..Self::LEN)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        Self(code)
    }

    pub fn parse(raw: &str) -> Result<Self, IdentifierValidationError> {
        if raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_owned()))
        } else {
            Err(IdentifierValidationError::InvalidSecretCode { expected: Self::LEN })
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Render as `XXX-XXX` for humans.
    ///
    /// # Examples
    /// ```
    /// use booking::domain::SecretCode;
    ///
    /// let code = SecretCode::parse("123456").expect("six digits");
    /// assert_eq!(code.display_form(), "123-456");
    /// ```
    pub fn display_form(&self) -> String {
        let (head, tail) = self.0.split_at(Self::LEN / 2);
        format!("{head}-{tail}")
    }
}

// Keep the code out of logs.
impl fmt::Debug for SecretCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretCode(******)")
    }
}

impl From<SecretCode> for String {
    fn from(value: SecretCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for SecretCode {
    type Error = IdentifierValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Fresh public identifier from the thread-local generator.
pub fn new_booking_id() -> PublicBookingId {
    PublicBookingId::generate(&mut rand::thread_rng())
}

/// Fresh secret code from the thread-local generator.
pub fn new_secret_code() -> SecretCode {
    SecretCode::generate(&mut rand::thread_rng())
}
