//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{bookings, transaction_tokens};

/// Insertable booking row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub(crate) struct NewBookingRow<'a> {
    pub place_key: &'a str,
    pub booking_key: &'a str,
    pub public_key: &'a str,
    pub place_id: &'a str,
    pub slot_id: &'a str,
    pub start_datetime: &'a str,
    pub duration: i32,
    pub secret_code: &'a str,
    pub booked_people: i32,
    pub method: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub entered: bool,
}

/// Columns needed to delete a booking again.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookingLocatorRow {
    pub place_id: String,
    pub slot_id: String,
    pub booking_key: String,
    pub booked_people: i32,
}

/// Stored token with its fingerprint.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = transaction_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TransactionTokenRow {
    pub token: String,
    pub fingerprint: Vec<u8>,
    pub applied_at: DateTime<Utc>,
}

/// Insertable token row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transaction_tokens)]
pub(crate) struct NewTransactionTokenRow<'a> {
    pub token: &'a str,
    pub fingerprint: &'a [u8],
    pub applied_at: DateTime<Utc>,
}
