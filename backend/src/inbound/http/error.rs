//! HTTP adapter mapping for domain errors.
//!
//! Business-rule failures share `400 Bad Request` with validation failures;
//! clients tell them apart through `code` and the presence of `userMessage`.
//! Server-side failures keep their code but lose their message, which may
//! name hosts, pools or relays.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::Conflict | ErrorCode::NotFound => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::DeliveryFailed => StatusCode::BAD_GATEWAY,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::RollbackFailed | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Replacement text for codes whose message may carry storage or relay detail.
fn public_message(code: ErrorCode) -> Option<&'static str> {
    match code {
        ErrorCode::InternalError => Some("Internal server error"),
        ErrorCode::ServiceUnavailable => Some("Booking storage is temporarily unavailable"),
        ErrorCode::RollbackFailed => Some("Booking could not be confirmed or released"),
        _ => None,
    }
}

fn redact(error: &Error) -> Error {
    let Some(message) = public_message(error.code()) else {
        return error.clone();
    };
    let mut redacted = Error::new(error.code(), message);
    if let Some(user_message) = error.user_message() {
        redacted = redacted.with_user_message(user_message.to_owned());
    }
    if let Some(id) = error.trace_id() {
        redacted = redacted.with_trace_id(id.to_owned());
    }
    redacted
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            warn!(
                code = ?self.code(),
                message = self.message(),
                trace_id = self.trace_id(),
                "booking request failed"
            );
        }
        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(redact(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}
