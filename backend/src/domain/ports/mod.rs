//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports ([`BookingCommand`], [`BookingCancellation`]) are called by
//! inbound adapters. Driven ports (store, transports, place directory,
//! confirmation sender) are implemented by outbound adapters and injected
//! into the domain services.

mod macros;
pub(crate) use macros::define_port_error;

mod booking_cancellation;
mod booking_command;
mod booking_store;
mod confirmation_sender;
mod email_transport;
mod place_directory;
mod sms_transport;

#[cfg(test)]
pub use booking_cancellation::MockBookingCancellation;
pub use booking_cancellation::{
    BookingCancellation, CancelBookingRequest, FixtureBookingCancellation,
};
#[cfg(test)]
pub use booking_command::MockBookingCommand;
pub use booking_command::{BookingCommand, CreateBookingRequest, FixtureBookingCommand};
#[cfg(test)]
pub use booking_store::MockBookingStore;
pub use booking_store::{BookingStore, BookingStoreError};
#[cfg(test)]
pub use confirmation_sender::MockConfirmationSender;
pub use confirmation_sender::{ConfirmationSender, NotificationError};
#[cfg(test)]
pub use email_transport::MockEmailTransport;
pub use email_transport::{
    EmailMessage, EmailTransport, EmailTransportError, FixtureEmailTransport,
};
#[cfg(test)]
pub use place_directory::MockPlaceDirectory;
pub use place_directory::{FixturePlaceDirectory, PlaceDirectory, PlaceDirectoryError};
#[cfg(test)]
pub use sms_transport::MockSmsTransport;
pub use sms_transport::{FixtureSmsTransport, SmsMessage, SmsTransport, SmsTransportError};
