//! HTTP gateway delivery for confirmation text messages.

mod http_sms_transport;

pub use http_sms_transport::HttpSmsTransport;
