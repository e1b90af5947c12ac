//! Driving port for booking cancellation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, PublicBookingId};

/// Request to cancel a booking by its public identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelBookingRequest {
    pub booking_id: String,
    pub token: String,
}

/// Driving port for booking cancellation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingCancellation: Send + Sync {
    /// Delete the booking and give its places back to the slot.
    ///
    /// Fails with `not_found` when no booking has this public id.
    async fn cancel_booking(&self, request: CancelBookingRequest) -> Result<(), Error>;
}

/// Fixture cancellation that accepts every well-formed identifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingCancellation;

#[async_trait]
impl BookingCancellation for FixtureBookingCancellation {
    async fn cancel_booking(&self, request: CancelBookingRequest) -> Result<(), Error> {
        PublicBookingId::parse(&request.booking_id)
            .map(|_| ())
            .map_err(|err| Error::invalid_request(err.to_string()))
    }
}
