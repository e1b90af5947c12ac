//! OpenAPI document for the booking API.
//!
//! Served by Swagger UI in debug builds and printed by the `openapi-dump`
//! binary for client generation.

use utoipa::OpenApi;

use crate::domain::{BookingReceipt, ContactMethod, Error, ErrorCode};
use crate::inbound::http::bookings::BookingRequestBody;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Slot booking API",
        description = "Book and cancel places in venue time slots."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::bookings::create_booking,
        crate::inbound::http::bookings::cancel_booking,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(BookingRequestBody, BookingReceipt, ContactMethod, Error, ErrorCode)),
    tags(
        (name = "bookings", description = "Slot bookings"),
        (name = "health", description = "Probes for orchestrators")
    )
)]
pub struct ApiDoc;
