//! Port for the transactional booking store.
//!
//! Implementations apply a [`BookingTransaction`] atomically and at most once
//! per [`TransactionToken`] within the retention window:
//!
//! - unseen (or expired) token: apply both halves or neither;
//! - same token, same transaction: succeed without applying again;
//! - same token, different transaction: [`BookingStoreError::Conflict`].
//!
//! Duplicate keys, missing capacity and token collisions all surface as the
//! one `Conflict` variant; callers are never told which half failed.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{BookingLocator, BookingTransaction, PublicBookingId, TransactionToken};

use super::define_port_error;

define_port_error! {
    /// Errors raised by booking store adapters.
    pub enum BookingStoreError {
        /// A condition of the transaction did not hold.
        Conflict { message: String } => "booking transaction rejected: {message}",
        /// The store could not be reached.
        Connection { message: String } => "booking store connection failed: {message}",
        /// The store failed while executing a query.
        Query { message: String } => "booking store query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Apply `transaction` atomically, deduplicated by `token`.
    async fn apply(
        &self,
        transaction: &BookingTransaction,
        token: &TransactionToken,
    ) -> Result<(), BookingStoreError>;

    /// Resolve a public booking id through the secondary index.
    async fn find_booking(
        &self,
        public_id: &PublicBookingId,
    ) -> Result<Option<BookingLocator>, BookingStoreError>;

    /// Forget tokens consumed more than `ttl` ago. Returns how many were
    /// removed.
    async fn purge_expired_tokens(&self, ttl: Duration) -> Result<u64, BookingStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_does_not_name_the_failing_half() {
        let err = BookingStoreError::conflict("transaction conditions not met");
        assert_eq!(
            err.to_string(),
            "booking transaction rejected: transaction conditions not met"
        );
    }
}
