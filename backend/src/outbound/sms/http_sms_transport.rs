//! Reqwest-backed `SmsTransport` posting JSON to a gateway endpoint.
//!
//! The gateway receives `{to, body, senderId, maxPrice}` and authenticates
//! the caller through a bearer API key. Any 2xx status counts as accepted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::debug;

use crate::domain::ports::{SmsMessage, SmsTransport, SmsTransportError};

/// Wire body sent to the gateway.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SmsRequestDto<'a> {
    to: &'a str,
    body: &'a str,
    sender_id: &'a str,
    max_price: &'a str,
}

impl<'a> From<&'a SmsMessage> for SmsRequestDto<'a> {
    fn from(message: &'a SmsMessage) -> Self {
        Self {
            to: message.to.as_str(),
            body: message.body.as_str(),
            sender_id: message.sender_id.as_str(),
            max_price: message.max_price.as_str(),
        }
    }
}

/// SMS transport performing one POST per message.
pub struct HttpSmsTransport {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl HttpSmsTransport {
    /// Build a transport with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl SmsTransport for HttpSmsTransport {
    async fn send(&self, message: &SmsMessage) -> Result<(), SmsTransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&SmsRequestDto::from(message))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %message.to, status = status.as_u16(), "sms gateway accepted message");
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn map_transport_error(error: reqwest::Error) -> SmsTransportError {
    SmsTransportError::connection(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SmsTransportError {
    const PREVIEW_CHAR_LIMIT: usize = 120;

    let preview = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect::<String>();
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    };

    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        SmsTransportError::connection(message)
    } else {
        SmsTransportError::rejected(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::normalize_phone;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn request_body_uses_gateway_field_names() {
        let message = SmsMessage {
            to: normalize_phone("333 123 4567").expect("valid phone"),
            body: "Il tuo codice è: 123456".to_owned(),
            sender_id: "Avatarlab".to_owned(),
            max_price: "0.10".to_owned(),
        };

        let value = serde_json::to_value(SmsRequestDto::from(&message)).expect("serializes");
        assert_eq!(
            value,
            json!({
                "to": "+393331234567",
                "body": "Il tuo codice è: 123456",
                "senderId": "Avatarlab",
                "maxPrice": "0.10",
            })
        );
    }

    #[rstest]
    #[case(StatusCode::BAD_REQUEST, b"invalid   number".as_slice(), "status 400: invalid number", false)]
    #[case(StatusCode::UNAUTHORIZED, b"".as_slice(), "status 401", false)]
    #[case(StatusCode::TOO_MANY_REQUESTS, b"slow down".as_slice(), "status 429: slow down", true)]
    #[case(StatusCode::BAD_GATEWAY, b"".as_slice(), "status 502", true)]
    fn status_errors_split_by_retryability(
        #[case] status: StatusCode,
        #[case] body: &[u8],
        #[case] expected_message: &str,
        #[case] connection: bool,
    ) {
        let error = map_status_error(status, body);
        let expected = if connection {
            SmsTransportError::connection(expected_message)
        } else {
            SmsTransportError::rejected(expected_message)
        };
        assert_eq!(error, expected);
    }
}
