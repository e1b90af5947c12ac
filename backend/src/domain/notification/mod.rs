//! Booking confirmation dispatch.
//!
//! [`ConfirmationDispatcher`] picks the channel from the booking's contact
//! method: email when the method is `email` and an address is present, SMS
//! when the method is `phone` and a number is present. Any other combination
//! fails with [`NotificationError::BadRequest`] before a transport is touched.

mod content;
mod settings;

pub use content::ConfirmationContent;
pub use settings::{ConfirmationSettings, ConfirmationSettingsError};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{
    ConfirmationSender, EmailTransport, NotificationError, PlaceDirectory, SmsTransport,
};
use crate::domain::{Booking, ContactMethod};

/// Sends confirmations through the email and SMS transports.
#[derive(Clone)]
pub struct ConfirmationDispatcher {
    email: Arc<dyn EmailTransport>,
    sms: Arc<dyn SmsTransport>,
    places: Arc<dyn PlaceDirectory>,
    settings: ConfirmationSettings,
}

impl ConfirmationDispatcher {
    pub fn new(
        email: Arc<dyn EmailTransport>,
        sms: Arc<dyn SmsTransport>,
        places: Arc<dyn PlaceDirectory>,
        settings: ConfirmationSettings,
    ) -> Self {
        Self {
            email,
            sms,
            places,
            settings,
        }
    }

    /// Place display name, falling back to the raw id when the lookup has no
    /// answer or fails.
    async fn place_name(&self, booking: &Booking) -> String {
        match self.places.place_name(booking.place_id()).await {
            Ok(Some(name)) => name,
            Ok(None) => booking.place_id().to_string(),
            Err(error) => {
                warn!(%error, place_id = %booking.place_id(), "place name lookup failed");
                booking.place_id().to_string()
            }
        }
    }
}

#[async_trait]
impl ConfirmationSender for ConfirmationDispatcher {
    async fn send_confirmation(&self, booking: &Booking) -> Result<(), NotificationError> {
        let content = ConfirmationContent::for_booking(booking, &self.settings);
        match (booking.method(), booking.email(), booking.phone()) {
            (ContactMethod::Email, Some(address), _) => {
                let place_name = self.place_name(booking).await;
                let message = content.email(address, &place_name, &self.settings);
                debug!(public_id = %booking.public_id(), channel = "email", "sending confirmation");
                self.email
                    .send(&message)
                    .await
                    .map_err(|err| NotificationError::delivery(err.to_string()))
            }
            (ContactMethod::Phone, _, Some(number)) => {
                let message = content.sms(number, &self.settings);
                debug!(public_id = %booking.public_id(), channel = "sms", "sending confirmation");
                self.sms
                    .send(&message)
                    .await
                    .map_err(|err| NotificationError::delivery(err.to_string()))
            }
            (method, _, _) => Err(NotificationError::bad_request(format!(
                "booking method is {} but no matching contact was provided",
                method.as_str()
            ))),
        }
    }
}

#[cfg(test)]
mod tests;
