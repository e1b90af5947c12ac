//! Domain primitives, aggregates and services.
//!
//! Purpose: model slot bookings and the rules that keep a booking row and its
//! slot's capacity counter in step. Nothing here knows about HTTP or SQL;
//! adapters reach the domain through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - Booking, create_booking and identifiers: the booking entity.
//! - EmailAddress, PhoneNumber, normalize_phone: contact validation.
//! - BookingTransaction plus the idempotency types: what stores apply.
//! - ConfirmationDispatcher: email/SMS confirmation.
//! - BookingService / CancellationService: the orchestrators.

pub mod booking;
mod booking_error;
mod booking_service;
mod cancellation_service;
pub mod contact;
pub mod error;
pub mod idempotency;
pub mod notification;
pub mod ports;
mod trace_id;
mod transaction;

pub use self::booking::{
    Booking, BookingKey, BookingLocator, BookingReceipt, ContactMethod, IdentifierValidationError,
    NewBooking, PlaceId, PlaceInfoKey, PlaceKey, PublicBookingId, PublicBookingKey, SecretCode,
    SlotId, SlotIdValidationError, SlotKey, create_booking, new_booking_id, new_secret_code,
};
pub use self::booking_error::BookingError;
pub use self::booking_service::{BookingService, validate_booking_request};
pub use self::cancellation_service::CancellationService;
pub use self::contact::{
    ContactValidationError, EmailAddress, PhoneNumber, normalize_phone, validate_email,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::idempotency::{
    FingerprintError, TokenCheck, TokenRecord, TokenRetention, TransactionFingerprint,
    TransactionToken, TransactionTokenValidationError, fingerprint,
};
pub use self::notification::{
    ConfirmationContent, ConfirmationDispatcher, ConfirmationSettings, ConfirmationSettingsError,
};
pub use self::trace_id::TraceId;
pub use self::transaction::BookingTransaction;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use booking::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no such booking"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
