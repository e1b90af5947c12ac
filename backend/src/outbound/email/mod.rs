//! SMTP delivery for confirmation emails.

mod smtp_email_transport;

pub use smtp_email_transport::{SmtpEmailTransport, SmtpRelay};
