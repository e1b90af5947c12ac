//! PostgreSQL-backed `BookingStore` implementation using Diesel ORM.
//!
//! Every transaction runs inside one SQL transaction:
//!
//! 1. claim the token with `INSERT … ON CONFLICT DO NOTHING`; when the token
//!    already exists, lock its row and decide replay, collision or reuse;
//! 2. insert or delete the booking row (zero affected rows is a conflict);
//! 3. adjust `available_places`, guarded by `available_places >= n` on the
//!    way down and by the table's bounds check on the way up.
//!
//! Any conflict returns an error from the transaction closure, so nothing is
//! committed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{BookingStore, BookingStoreError};
use crate::domain::{
    Booking, BookingKey, BookingLocator, BookingTransaction, PlaceId, PublicBookingId,
    PublicBookingKey, SlotId, TokenCheck, TokenRecord, TokenRetention, TransactionFingerprint,
    TransactionToken,
};

use super::models::{
    BookingLocatorRow, NewBookingRow, NewTransactionTokenRow, TransactionTokenRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{bookings, slots, transaction_tokens};

const CONDITIONS_NOT_MET: &str = "transaction conditions not met";

/// Diesel-backed implementation of the `BookingStore` port.
#[derive(Clone)]
pub struct DieselBookingStore {
    pool: DbPool,
    clock: Arc<dyn Clock>,
    retention: TokenRetention,
}

impl DieselBookingStore {
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>, retention: TokenRetention) -> Self {
        Self {
            pool,
            clock,
            retention,
        }
    }
}

/// Failure inside the SQL transaction closure.
#[derive(Debug)]
enum ApplyError {
    Conflict(&'static str),
    Store(BookingStoreError),
    Diesel(DieselError),
}

impl From<DieselError> for ApplyError {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

impl From<ApplyError> for BookingStoreError {
    fn from(error: ApplyError) -> Self {
        match error {
            ApplyError::Conflict(message) => BookingStoreError::conflict(message),
            ApplyError::Store(error) => error,
            ApplyError::Diesel(error) => map_diesel_error(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Applied,
    Replayed,
}

fn map_pool_error(error: PoolError) -> BookingStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            BookingStoreError::connection(message)
        }
    }
}

fn map_diesel_error(error: DieselError) -> BookingStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => BookingStoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => BookingStoreError::query("database query error"),
        DieselError::DatabaseError(kind, _) => match kind {
            DatabaseErrorKind::UniqueViolation
            | DatabaseErrorKind::CheckViolation
            | DatabaseErrorKind::SerializationFailure => {
                BookingStoreError::conflict(CONDITIONS_NOT_MET)
            }
            DatabaseErrorKind::ClosedConnection => {
                BookingStoreError::connection("database connection error")
            }
            _ => BookingStoreError::query("database error"),
        },
        _ => BookingStoreError::query("database error"),
    }
}

fn to_db_int(value: u32, column: &str) -> Result<i32, BookingStoreError> {
    i32::try_from(value)
        .map_err(|_| BookingStoreError::query(format!("{column} value {value} out of range")))
}

fn row_to_record(row: TransactionTokenRow) -> Result<TokenRecord, BookingStoreError> {
    let token = TransactionToken::new(row.token)
        .map_err(|err| BookingStoreError::query(format!("corrupted token in database: {err}")))?;
    let fingerprint = TransactionFingerprint::try_from_bytes(&row.fingerprint).map_err(|err| {
        BookingStoreError::query(format!("corrupted token fingerprint in database: {err}"))
    })?;
    Ok(TokenRecord {
        token,
        fingerprint,
        applied_at: row.applied_at,
    })
}

fn row_to_locator(row: BookingLocatorRow) -> Result<BookingLocator, BookingStoreError> {
    let corrupted = |err: String| BookingStoreError::query(format!("corrupted booking row: {err}"));
    Ok(BookingLocator {
        place_id: PlaceId::new(row.place_id).map_err(|err| corrupted(err.to_string()))?,
        slot_id: SlotId::parse(&row.slot_id).map_err(|err| corrupted(err.to_string()))?,
        booking_key: BookingKey::from_stored(row.booking_key),
        people: u32::try_from(row.booked_people)
            .map_err(|_| corrupted(format!("negative people count {}", row.booked_people)))?,
    })
}

async fn claim_token(
    conn: &mut AsyncPgConnection,
    token: &TransactionToken,
    fingerprint: &TransactionFingerprint,
    now: DateTime<Utc>,
    ttl: Duration,
) -> Result<Outcome, ApplyError> {
    let inserted = diesel::insert_into(transaction_tokens::table)
        .values(&NewTransactionTokenRow {
            token: token.as_str(),
            fingerprint: fingerprint.as_bytes(),
            applied_at: now,
        })
        .on_conflict_do_nothing()
        .execute(conn)
        .await?;
    if inserted == 1 {
        return Ok(Outcome::Applied);
    }

    let row: TransactionTokenRow = transaction_tokens::table
        .find(token.as_str())
        .select(TransactionTokenRow::as_select())
        .for_update()
        .first(conn)
        .await?;
    let record = row_to_record(row).map_err(ApplyError::Store)?;
    match record.check(fingerprint, now, ttl) {
        TokenCheck::Replay => Ok(Outcome::Replayed),
        TokenCheck::Collision => Err(ApplyError::Conflict(
            "transaction token already used for a different transaction",
        )),
        TokenCheck::Apply => {
            diesel::update(transaction_tokens::table.find(token.as_str()))
                .set((
                    transaction_tokens::fingerprint.eq(fingerprint.as_bytes().as_slice()),
                    transaction_tokens::applied_at.eq(now),
                ))
                .execute(conn)
                .await?;
            Ok(Outcome::Applied)
        }
    }
}

async fn insert_booking(
    conn: &mut AsyncPgConnection,
    booking: &Booking,
    at: DateTime<Utc>,
) -> Result<(), ApplyError> {
    let place_key = booking.place_key();
    let slot_key = booking.slot_key();
    let booking_key = booking.booking_key();
    let public_key = booking.public_key();
    let place_id = booking.place_id().to_string();
    let slot_id = booking.slot_id().to_string();
    let people = to_db_int(booking.people(), "booked_people").map_err(ApplyError::Store)?;
    let row = NewBookingRow {
        place_key: place_key.as_str(),
        booking_key: booking_key.as_str(),
        public_key: public_key.as_str(),
        place_id: &place_id,
        slot_id: &slot_id,
        start_datetime: booking.start_raw(),
        duration: to_db_int(booking.duration_minutes(), "duration").map_err(ApplyError::Store)?,
        secret_code: booking.secret_code().as_str(),
        booked_people: people,
        method: booking.method().as_str(),
        email: booking.email().map(|email| email.as_str()),
        phone: booking.phone().map(|phone| phone.as_str()),
        created_at: booking.created_at(),
        last_update: booking.last_update(),
        entered: booking.entered(),
    };

    let inserted = diesel::insert_into(bookings::table)
        .values(&row)
        .on_conflict_do_nothing()
        .execute(conn)
        .await?;
    if inserted == 0 {
        return Err(ApplyError::Conflict(CONDITIONS_NOT_MET));
    }

    let updated = diesel::update(
        slots::table
            .filter(slots::place_key.eq(place_key.as_str()))
            .filter(slots::slot_key.eq(slot_key.as_str()))
            .filter(slots::available_places.ge(people)),
    )
    .set((
        slots::available_places.eq(slots::available_places - people),
        slots::last_update.eq(at),
    ))
    .execute(conn)
    .await?;
    if updated == 0 {
        return Err(ApplyError::Conflict(CONDITIONS_NOT_MET));
    }
    Ok(())
}

async fn delete_booking(
    conn: &mut AsyncPgConnection,
    locator: &BookingLocator,
    at: DateTime<Utc>,
) -> Result<(), ApplyError> {
    let place_key = locator.place_key();
    let slot_key = locator.slot_key();
    let people = to_db_int(locator.people, "booked_people").map_err(ApplyError::Store)?;

    let deleted = diesel::delete(
        bookings::table
            .filter(bookings::place_key.eq(place_key.as_str()))
            .filter(bookings::booking_key.eq(locator.booking_key.as_str())),
    )
    .execute(conn)
    .await?;
    if deleted == 0 {
        return Err(ApplyError::Conflict(CONDITIONS_NOT_MET));
    }

    diesel::update(
        slots::table
            .filter(slots::place_key.eq(place_key.as_str()))
            .filter(slots::slot_key.eq(slot_key.as_str())),
    )
    .set((
        slots::available_places.eq(slots::available_places + people),
        slots::last_update.eq(at),
    ))
    .execute(conn)
    .await?;
    Ok(())
}

async fn apply_atomically(
    conn: &mut AsyncPgConnection,
    transaction: &BookingTransaction,
    token: &TransactionToken,
    fingerprint: &TransactionFingerprint,
    now: DateTime<Utc>,
    ttl: Duration,
) -> Result<Outcome, ApplyError> {
    if claim_token(conn, token, fingerprint, now, ttl).await? == Outcome::Replayed {
        return Ok(Outcome::Replayed);
    }
    match transaction {
        BookingTransaction::Create { booking } => insert_booking(conn, booking, now).await?,
        BookingTransaction::Release { locator, at } => delete_booking(conn, locator, *at).await?,
    }
    Ok(Outcome::Applied)
}

#[async_trait]
impl BookingStore for DieselBookingStore {
    async fn apply(
        &self,
        transaction: &BookingTransaction,
        token: &TransactionToken,
    ) -> Result<(), BookingStoreError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let fingerprint = transaction
            .fingerprint()
            .map_err(|err| BookingStoreError::query(err.to_string()))?;
        let now = self.clock.utc();
        let ttl = self.retention.ttl();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction(|conn| {
                apply_atomically(conn, transaction, token, &fingerprint, now, ttl).scope_boxed()
            })
            .await?;
        debug!(
            kind = transaction.kind(),
            token = token.as_str(),
            replayed = outcome == Outcome::Replayed,
            "booking transaction committed"
        );
        Ok(())
    }

    async fn find_booking(
        &self,
        public_id: &PublicBookingId,
    ) -> Result<Option<BookingLocator>, BookingStoreError> {
        let public_key = PublicBookingKey::for_booking(public_id);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = bookings::table
            .filter(bookings::public_key.eq(public_key.as_str()))
            .select(BookingLocatorRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_locator).transpose()
    }

    async fn purge_expired_tokens(&self, ttl: Duration) -> Result<u64, BookingStoreError> {
        let cutoff = self.clock.utc()
            - chrono::Duration::from_std(ttl)
                .map_err(|err| BookingStoreError::query(format!("invalid TTL duration: {err}")))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(transaction_tokens::table)
            .filter(transaction_tokens::applied_at.le(cutoff))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        debug!(deleted, cutoff = %cutoff, "purged expired transaction tokens");
        Ok(u64::try_from(deleted).unwrap_or(u64::MAX))
    }
}
