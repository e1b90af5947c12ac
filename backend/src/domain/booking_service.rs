//! Booking orchestration.
//!
//! A request moves through validation, building, persistence and
//! notification. When notification fails the booking is released again
//! under a token derived from the request token, once, and the notification
//! error is returned. A failed release surfaces as
//! [`BookingError::RollbackFailed`] carrying both causes.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info, warn};

use crate::domain::ports::{
    BookingCommand, BookingStore, ConfirmationSender, CreateBookingRequest, NotificationError,
};
use crate::domain::{
    Booking, BookingError, BookingReceipt, BookingTransaction, ContactMethod, EmailAddress, Error,
    NewBooking, PlaceId, SlotId, TransactionToken, create_booking, normalize_phone,
};

/// Validate raw booking input into builder arguments and a token.
///
/// People must be a positive integer; exactly one of email and phone must be
/// present. The email is lowercased before it is checked and the phone is
/// normalised. Blank contact values count as absent.
pub fn validate_booking_request(
    request: CreateBookingRequest,
) -> Result<(NewBooking, TransactionToken), BookingError> {
    let place_id =
        PlaceId::new(request.place_id).map_err(|err| BookingError::validation(err.to_string()))?;
    let slot_id =
        SlotId::parse(&request.slot_id).map_err(|err| BookingError::validation(err.to_string()))?;
    let people = request
        .people
        .filter(|people| *people >= 1)
        .and_then(|people| u32::try_from(people).ok())
        .ok_or_else(|| BookingError::validation("people must be a positive integer"))?;

    let email = request.email.filter(|value| !value.trim().is_empty());
    let phone = request.phone.filter(|value| !value.trim().is_empty());
    let (method, email, phone) = match (email, phone) {
        (Some(email), None) => {
            let email = EmailAddress::parse(&email)
                .map_err(|err| BookingError::validation(err.to_string()))?;
            (ContactMethod::Email, Some(email), None)
        }
        (None, Some(phone)) => {
            let phone =
                normalize_phone(&phone).map_err(|err| BookingError::validation(err.to_string()))?;
            (ContactMethod::Phone, None, Some(phone))
        }
        (Some(_), Some(_)) => {
            return Err(BookingError::validation(
                "provide either an email or a phone number, not both",
            ));
        }
        (None, None) => {
            return Err(BookingError::validation(
                "an email or a phone number is required",
            ));
        }
    };

    let token =
        TransactionToken::new(request.token).map_err(|err| BookingError::validation(err.to_string()))?;

    Ok((
        NewBooking {
            place_id,
            slot_id,
            people,
            method,
            email,
            phone,
        },
        token,
    ))
}

/// Domain service implementing [`BookingCommand`].
#[derive(Clone)]
pub struct BookingService<S, N> {
    store: Arc<S>,
    sender: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<S, N> BookingService<S, N> {
    pub fn new(store: Arc<S>, sender: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            sender,
            clock,
        }
    }

    fn build(&self, new_booking: NewBooking) -> Booking {
        create_booking(new_booking, self.clock.as_ref(), &mut rand::thread_rng())
    }
}

impl<S, N> BookingService<S, N>
where
    S: BookingStore,
    N: ConfirmationSender,
{
    /// Run the whole flow for raw input.
    pub async fn book(&self, request: CreateBookingRequest) -> Result<BookingReceipt, BookingError> {
        let (new_booking, token) = validate_booking_request(request)?;
        info!(
            place_id = %new_booking.place_id,
            slot_id = %new_booking.slot_id,
            people = new_booking.people,
            method = new_booking.method.as_str(),
            "booking.validated"
        );
        let booking = self.build(new_booking);
        self.persist_and_confirm(booking, &token).await
    }

    /// Persist an already built booking and confirm it, rolling back when
    /// the confirmation cannot be sent.
    pub async fn persist_and_confirm(
        &self,
        booking: Booking,
        token: &TransactionToken,
    ) -> Result<BookingReceipt, BookingError> {
        self.store
            .apply(&BookingTransaction::create(booking.clone()), token)
            .await?;
        info!(
            public_id = %booking.public_id(),
            slot_id = %booking.slot_id(),
            people = booking.people(),
            "booking.persisted"
        );

        match self.sender.send_confirmation(&booking).await {
            Ok(()) => {
                info!(public_id = %booking.public_id(), "booking.notified");
                Ok(booking.receipt())
            }
            Err(trigger) => {
                warn!(error = %trigger, public_id = %booking.public_id(), "confirmation failed");
                Err(self.roll_back(&booking, token, trigger).await)
            }
        }
    }

    async fn roll_back(
        &self,
        booking: &Booking,
        token: &TransactionToken,
        trigger: NotificationError,
    ) -> BookingError {
        let release = BookingTransaction::release(booking.locator(), self.clock.utc());
        match self.store.apply(&release, &token.rollback()).await {
            Ok(()) => {
                info!(public_id = %booking.public_id(), "booking.rolled_back");
                BookingError::Notification(trigger)
            }
            Err(rollback) => {
                error!(
                    public_id = %booking.public_id(),
                    trigger = %trigger,
                    rollback = %rollback,
                    "booking.rollback_failed"
                );
                BookingError::RollbackFailed { trigger, rollback }
            }
        }
    }
}

#[async_trait]
impl<S, N> BookingCommand for BookingService<S, N>
where
    S: BookingStore,
    N: ConfirmationSender,
{
    async fn create_booking(&self, request: CreateBookingRequest) -> Result<BookingReceipt, Error> {
        self.book(request).await.map_err(Error::from)
    }
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;
