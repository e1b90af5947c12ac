//! Two-item atomic transactions applied by the booking store.
//!
//! Each variant pairs a booking row change with the matching capacity change
//! on the slot row. Stores apply both halves or neither.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{
    Booking, BookingLocator, FingerprintError, TransactionFingerprint, fingerprint,
};

/// Operation applied atomically against a place's rows.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingTransaction {
    /// Insert the booking (fails on an existing internal or public key) and
    /// take `people` places from the slot (fails below zero).
    Create { booking: Booking },
    /// Delete the booking row and give its places back.
    ///
    /// Also used by the compensating rollback of a failed confirmation.
    Release {
        locator: BookingLocator,
        at: DateTime<Utc>,
    },
}

impl BookingTransaction {
    pub fn create(booking: Booking) -> Self {
        Self::Create { booking }
    }

    pub fn release(locator: BookingLocator, at: DateTime<Utc>) -> Self {
        Self::Release { locator, at }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Release { .. } => "release",
        }
    }

    /// Fingerprint used to recognise a re-delivery under the same token.
    ///
    /// Timestamps are left out so a retried release matches the first one.
    pub fn fingerprint(&self) -> Result<TransactionFingerprint, FingerprintError> {
        let canonical = match self {
            Self::Create { booking } => json!({
                "kind": self.kind(),
                "placeKey": booking.place_key(),
                "slotKey": booking.slot_key(),
                "bookingKey": booking.booking_key(),
                "publicKey": booking.public_key(),
                "people": booking.people(),
            }),
            Self::Release { locator, .. } => json!({
                "kind": self.kind(),
                "placeKey": locator.place_key(),
                "slotKey": locator.slot_key(),
                "bookingKey": locator.booking_key,
                "people": locator.people,
            }),
        };
        fingerprint(&canonical)
    }
}
