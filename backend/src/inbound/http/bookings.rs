//! Booking API handlers.
//!
//! ```text
//! POST   /api/v1/places/{placeId}/slots/{slotId}/bookings  Book places in a slot
//! DELETE /api/v1/bookings/{bookingId}                      Cancel a booking
//! ```
//!
//! Both operations run under a transaction token taken from the
//! `Idempotency-Key` header, so a retried request is applied at most once.
//! Without the header the token is the server-minted trace id, which makes
//! every such request a fresh attempt. Tokens are prefixed with the operation
//! (`create:` or `cancel:`), so one key never covers two kinds of write.

use actix_web::http::header::HeaderMap;
use actix_web::{HttpRequest, HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::{CancelBookingRequest, CreateBookingRequest};
use crate::domain::{BookingReceipt, Error, TraceId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// HTTP header carrying a client-chosen transaction token.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Booking request body.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequestBody {
    /// Number of people; a positive integer.
    #[schema(value_type = Option<i64>, example = 2)]
    #[serde(default)]
    pub people: Option<Value>,
    #[schema(example = "mario.rossi@example.com")]
    #[serde(default)]
    pub email: Option<String>,
    #[schema(example = "+393331234567")]
    #[serde(default)]
    pub phone: Option<String>,
}

/// JSON extractor settings turning malformed bodies into `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid request body: {err}")).into()
    })
}

/// Write operation a transaction token is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Create,
    Cancel,
}

impl Operation {
    fn prefix(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Cancel => "cancel",
        }
    }
}

/// Read the transaction token for this request, scoped to `operation`.
fn transaction_token(operation: Operation, headers: &HeaderMap) -> Result<String, Error> {
    let key = match headers.get(IDEMPOTENCY_KEY_HEADER) {
        Some(value) => value.to_str().map(str::to_owned).map_err(|_| {
            Error::invalid_request("Idempotency-Key header must be visible ASCII")
        })?,
        None => TraceId::current_or_fresh().to_string(),
    };
    Ok(format!("{}:{key}", operation.prefix()))
}

fn people_count(people: Option<Value>) -> Result<Option<i64>, Error> {
    match people {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| Error::invalid_request("people must be a positive integer")),
    }
}

/// Book places in a slot.
///
/// The response omits the booking id and secret code; they are only sent to
/// the contact given in the body.
#[utoipa::path(
    post,
    path = "/api/v1/places/{placeId}/slots/{slotId}/bookings",
    request_body = BookingRequestBody,
    params(
        ("placeId" = String, Path, description = "Place identifier"),
        ("slotId" = String, Path, description = "Slot start and length, `<ISO start>~<minutes>`"),
        ("Idempotency-Key" = Option<String>, Header, description = "Token deduplicating retries")
    ),
    responses(
        (status = 201, description = "Booking created and confirmation sent", body = BookingReceipt),
        (status = 400, description = "Invalid request, slot full or bad contact", body = Error),
        (status = 500, description = "Confirmation failed and the rollback failed too", body = Error),
        (status = 502, description = "Confirmation could not be delivered", body = Error),
        (status = 503, description = "Booking store unavailable", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "createBooking"
)]
#[post("/places/{place_id}/slots/{slot_id}/bookings")]
pub async fn create_booking(
    state: web::Data<HttpState>,
    request: HttpRequest,
    path: web::Path<(String, String)>,
    payload: web::Json<BookingRequestBody>,
) -> ApiResult<HttpResponse> {
    let (place_id, slot_id) = path.into_inner();
    let BookingRequestBody {
        people,
        email,
        phone,
    } = payload.into_inner();

    let receipt = state
        .bookings
        .create_booking(CreateBookingRequest {
            place_id,
            slot_id,
            people: people_count(people)?,
            email,
            phone,
            token: transaction_token(Operation::Create, request.headers())?,
        })
        .await?;

    Ok(HttpResponse::Created().json(receipt))
}

/// Cancel a booking by its public id.
#[utoipa::path(
    delete,
    path = "/api/v1/bookings/{bookingId}",
    params(
        ("bookingId" = String, Path, description = "Twelve alphanumeric characters"),
        ("Idempotency-Key" = Option<String>, Header, description = "Token deduplicating retries")
    ),
    responses(
        (status = 204, description = "Booking cancelled"),
        (status = 400, description = "Unknown or malformed booking id", body = Error),
        (status = 503, description = "Booking store unavailable", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "cancelBooking"
)]
#[delete("/bookings/{booking_id}")]
pub async fn cancel_booking(
    state: web::Data<HttpState>,
    request: HttpRequest,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state
        .cancellations
        .cancel_booking(CancelBookingRequest {
            booking_id: path.into_inner(),
            token: transaction_token(Operation::Cancel, request.headers())?,
        })
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "bookings_tests.rs"]
mod tests;
