//! Booking cancellation.
//!
//! The public id is resolved through the store's secondary index, then the
//! booking row is deleted and its places are given back in one transaction
//! under the request token.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::booking_error::CANCELLATION_REJECTED_MESSAGE;
use crate::domain::ports::{BookingCancellation, BookingStore, CancelBookingRequest};
use crate::domain::{BookingError, BookingTransaction, Error, PublicBookingId, TransactionToken};

/// Domain service implementing [`BookingCancellation`].
#[derive(Clone)]
pub struct CancellationService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> CancellationService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S: BookingStore> CancellationService<S> {
    pub async fn cancel(
        &self,
        public_id: &PublicBookingId,
        token: &TransactionToken,
    ) -> Result<(), BookingError> {
        let locator = self
            .store
            .find_booking(public_id)
            .await?
            .ok_or_else(|| BookingError::NotFound {
                public_id: public_id.to_string(),
            })?;

        let people = locator.people;
        let slot_id = locator.slot_id.to_string();
        self.store
            .apply(&BookingTransaction::release(locator, self.clock.utc()), token)
            .await?;
        info!(public_id = %public_id, slot_id = %slot_id, people, "booking.cancelled");
        Ok(())
    }
}

#[async_trait]
impl<S: BookingStore> BookingCancellation for CancellationService<S> {
    async fn cancel_booking(&self, request: CancelBookingRequest) -> Result<(), Error> {
        let public_id = PublicBookingId::parse(&request.booking_id)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let token = TransactionToken::new(request.token)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.cancel(&public_id, &token).await.map_err(|err| match err {
            BookingError::Conflict { .. } => {
                Error::conflict(err.to_string()).with_user_message(CANCELLATION_REJECTED_MESSAGE)
            }
            other => Error::from(other),
        })
    }
}
