//! Port for delivering confirmation emails.

use async_trait::async_trait;

use crate::domain::EmailAddress;

use super::define_port_error;

define_port_error! {
    /// Errors raised by email transport adapters.
    pub enum EmailTransportError {
        /// The message could not be assembled (bad sender or headers).
        Build { message: String } => "email could not be built: {message}",
        /// The relay refused or failed to accept the message.
        Delivery { message: String } => "email delivery failed: {message}",
    }
}

/// Fully rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: EmailAddress,
    /// `Name <address>` mailbox.
    pub from: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    /// Classification tags forwarded as headers.
    pub tags: Vec<(String, String)>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailTransportError>;
}

/// Transport that accepts and discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEmailTransport;

#[async_trait]
impl EmailTransport for FixtureEmailTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailTransportError> {
        tracing::debug!(to = %message.to, subject = %message.subject, "fixture email discarded");
        Ok(())
    }
}
