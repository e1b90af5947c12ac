//! Lettre-backed `EmailTransport` talking to an SMTP relay.
//!
//! Messages go out as `multipart/alternative` with the plain body first so
//! clients without HTML support still show the confirmation code.

use async_trait::async_trait;
use lettre::message::header::{Header, HeaderName, HeaderValue};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::domain::ports::{EmailMessage, EmailTransport, EmailTransportError};

/// Relay connection details.
#[derive(Debug, Clone)]
pub struct SmtpRelay {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Upgrade the connection with STARTTLS; disable only for local relays.
    pub starttls: bool,
}

/// Email transport backed by an async lettre SMTP client.
#[derive(Clone)]
pub struct SmtpEmailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailTransport {
    /// Build the transport without opening a connection.
    ///
    /// # Errors
    ///
    /// Returns [`EmailTransportError::Build`] when the relay host cannot be
    /// used for TLS.
    pub fn new(relay: SmtpRelay) -> Result<Self, EmailTransportError> {
        let mut builder = if relay.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&relay.host)
                .map_err(|err| EmailTransportError::build(err.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&relay.host)
        };
        builder = builder.port(relay.port);
        if let (Some(username), Some(password)) = (relay.username, relay.password) {
            builder = builder.credentials(Credentials::new(username, password));
        }
        Ok(Self {
            mailer: builder.build(),
        })
    }
}

/// Classification tags rendered as `name=value` pairs in one header.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MessageTags(String);

impl MessageTags {
    fn render(tags: &[(String, String)]) -> Option<Self> {
        if tags.is_empty() {
            return None;
        }
        let value = tags
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        Some(Self(value))
    }
}

impl Header for MessageTags {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Message-Tags")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_owned()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

fn build_message(message: &EmailMessage) -> Result<Message, EmailTransportError> {
    let from: Mailbox = message
        .from
        .parse()
        .map_err(|err| EmailTransportError::build(format!("invalid sender: {err}")))?;
    let to: Mailbox = message
        .to
        .as_str()
        .parse()
        .map_err(|err| EmailTransportError::build(format!("invalid recipient: {err}")))?;

    let mut builder = Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.as_str());
    if let Some(tags) = MessageTags::render(&message.tags) {
        builder = builder.header(tags);
    }

    builder
        .multipart(MultiPart::alternative_plain_html(
            message.text_body.clone(),
            message.html_body.clone(),
        ))
        .map_err(|err| EmailTransportError::build(err.to_string()))
}

#[async_trait]
impl EmailTransport for SmtpEmailTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailTransportError> {
        let email = build_message(message)?;
        let response = self
            .mailer
            .send(email)
            .await
            .map_err(|err| EmailTransportError::delivery(err.to_string()))?;
        debug!(to = %message.to, code = %response.code(), "smtp relay accepted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmailAddress;
    use rstest::{fixture, rstest};

    #[fixture]
    fn message() -> EmailMessage {
        EmailMessage {
            to: EmailAddress::parse("mario.rossi@example.com").expect("valid address"),
            from: "Avatarlab <no-reply@example.com>".to_owned(),
            subject: "Conferma la tua prenotazione con Avatarlab".to_owned(),
            html_body: "<p>Codice <strong>123456</strong></p>".to_owned(),
            text_body: "Codice 123456".to_owned(),
            tags: vec![("EmailType".to_owned(), "BookingConfirmation".to_owned())],
        }
    }

    #[rstest]
    fn builds_multipart_message_with_tags(message: EmailMessage) {
        let built = build_message(&message).expect("message builds");
        let raw = String::from_utf8(built.formatted()).expect("utf-8 message");

        assert!(raw.contains("X-Message-Tags: EmailType=BookingConfirmation"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("Codice 123456"));
        assert!(raw.contains("To: mario.rossi@example.com"));
    }

    #[rstest]
    fn rejects_malformed_sender(mut message: EmailMessage) {
        message.from = "not a mailbox".to_owned();

        let error = build_message(&message).expect_err("sender is invalid");
        assert!(matches!(error, EmailTransportError::Build { .. }));
    }

    #[rstest]
    fn omits_tag_header_without_tags(mut message: EmailMessage) {
        message.tags.clear();

        let built = build_message(&message).expect("message builds");
        let raw = String::from_utf8(built.formatted()).expect("utf-8 message");
        assert!(!raw.contains("X-Message-Tags"));
    }

    #[rstest]
    fn local_relays_skip_tls() {
        let transport = SmtpEmailTransport::new(SmtpRelay {
            host: "localhost".to_owned(),
            port: 1025,
            username: None,
            password: None,
            starttls: false,
        });
        assert!(transport.is_ok());
    }
}
