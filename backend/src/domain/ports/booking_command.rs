//! Driving port for booking creation.
//!
//! The request carries raw, unvalidated input as received by an inbound
//! adapter. Implementations validate it, persist the booking under `token`,
//! and confirm it over the contact channel.

use async_trait::async_trait;
use mockable::DefaultClock;
use serde::{Deserialize, Serialize};

use crate::domain::{BookingReceipt, Error, create_booking, validate_booking_request};

/// Request to book places in a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub place_id: String,
    pub slot_id: String,
    /// Number of people; must be a positive integer.
    pub people: Option<i64>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Transaction token deduplicating retries of this request.
    pub token: String,
}

/// Driving port for booking creation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingCommand: Send + Sync {
    /// Validate, persist and confirm a booking.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use booking::domain::ports::{BookingCommand, CreateBookingRequest, FixtureBookingCommand};
    /// # async fn example() -> Result<(), booking::domain::Error> {
    /// let receipt = FixtureBookingCommand
    ///     .create_booking(CreateBookingRequest {
    ///         place_id: "gym-1".into(),
    ///         slot_id: "2026-05-04T18:30:00.000Z~60".into(),
    ///         people: Some(2),
    ///         email: Some("anna@example.it".into()),
    ///         phone: None,
    ///         token: "req-1".into(),
    ///     })
    ///     .await?;
    /// assert_eq!(receipt.booked_people, 2);
    /// # Ok(())
    /// # }
    /// ```
    async fn create_booking(&self, request: CreateBookingRequest) -> Result<BookingReceipt, Error>;
}

/// Fixture command that validates and builds but stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingCommand;

#[async_trait]
impl BookingCommand for FixtureBookingCommand {
    async fn create_booking(&self, request: CreateBookingRequest) -> Result<BookingReceipt, Error> {
        let (new_booking, _token) = validate_booking_request(request)?;
        let booking = create_booking(new_booking, &DefaultClock, &mut rand::thread_rng());
        Ok(booking.receipt())
    }
}
