//! At-most-once processing of booking transactions.
//!
//! - [`TransactionToken`]: opaque token naming one logical attempt.
//! - [`TransactionFingerprint`]: SHA-256 of the canonical transaction, used to
//!   tell a retry from a different request reusing the token.
//! - [`TokenRecord`] / [`TokenCheck`]: the replay decision every store adapter
//!   applies before touching booking or slot rows.
//! - [`TokenRetention`]: how long consumed tokens are remembered.
//!
//! Canonicalisation sorts object keys recursively and serialises compact JSON
//! before hashing, so field order never changes a fingerprint.

mod config;
mod fingerprint;
mod record;
mod token;

pub use config::TokenRetention;
pub use fingerprint::{FingerprintError, TransactionFingerprint, fingerprint};
pub use record::{TokenCheck, TokenRecord};
pub use token::{TransactionToken, TransactionTokenValidationError};
