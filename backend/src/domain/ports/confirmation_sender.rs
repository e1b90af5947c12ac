//! Port used by the booking orchestrator to confirm a stored booking.

use async_trait::async_trait;

use crate::domain::Booking;

use super::define_port_error;

define_port_error! {
    /// Errors raised while confirming a booking.
    pub enum NotificationError {
        /// The booking has no contact matching its method. Never retried.
        BadRequest { message: String } => "cannot confirm booking: {message}",
        /// The transport failed to deliver the confirmation.
        Delivery { message: String } => "confirmation delivery failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfirmationSender: Send + Sync {
    /// Deliver the confirmation over the booking's contact method.
    async fn send_confirmation(&self, booking: &Booking) -> Result<(), NotificationError>;
}
