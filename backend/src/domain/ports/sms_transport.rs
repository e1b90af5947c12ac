//! Port for delivering confirmation text messages.

use async_trait::async_trait;

use crate::domain::PhoneNumber;

use super::define_port_error;

define_port_error! {
    /// Errors raised by SMS transport adapters.
    pub enum SmsTransportError {
        /// The gateway could not be reached.
        Connection { message: String } => "sms gateway unreachable: {message}",
        /// The gateway rejected the message.
        Rejected { message: String } => "sms gateway rejected message: {message}",
    }
}

/// Rendered text message with sender metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    pub to: PhoneNumber,
    pub body: String,
    pub sender_id: String,
    /// Highest price accepted per message, as a decimal string.
    pub max_price: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsTransport: Send + Sync {
    async fn send(&self, message: &SmsMessage) -> Result<(), SmsTransportError>;
}

/// Transport that accepts and discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSmsTransport;

#[async_trait]
impl SmsTransport for FixtureSmsTransport {
    async fn send(&self, message: &SmsMessage) -> Result<(), SmsTransportError> {
        tracing::debug!(to = %message.to, "fixture sms discarded");
        Ok(())
    }
}
