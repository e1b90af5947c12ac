//! Stored token records and the replay decision shared by store adapters.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{TransactionFingerprint, TransactionToken};

/// A token the store has already consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub token: TransactionToken,
    pub fingerprint: TransactionFingerprint,
    pub applied_at: DateTime<Utc>,
}

/// What the store must do with an incoming transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    /// Token unseen or expired: apply the transaction.
    Apply,
    /// Same token, same transaction, still retained: succeed without applying.
    Replay,
    /// Same token, different transaction: reject.
    Collision,
}

impl TokenRecord {
    /// Decide how a delivery carrying this record's token is handled.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use booking::domain::{TokenCheck, TokenRecord, TransactionToken, fingerprint};
    /// use chrono::Utc;
    /// use serde_json::json;
    ///
    /// let now = Utc::now();
    /// let record = TokenRecord {
    ///     token: TransactionToken::new("t").expect("valid"),
    ///     fingerprint: fingerprint(&json!({"a": 1})).expect("hash"),
    ///     applied_at: now,
    /// };
    /// let same = fingerprint(&json!({"a": 1})).expect("hash");
    /// assert_eq!(record.check(&same, now, Duration::from_secs(60)), TokenCheck::Replay);
    /// ```
    pub fn check(
        &self,
        fingerprint: &TransactionFingerprint,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> TokenCheck {
        if self.is_expired(now, ttl) {
            TokenCheck::Apply
        } else if &self.fingerprint == fingerprint {
            TokenCheck::Replay
        } else {
            TokenCheck::Collision
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        self.applied_at
            .checked_add_signed(ttl)
            .is_some_and(|expiry| expiry <= now)
    }
}
