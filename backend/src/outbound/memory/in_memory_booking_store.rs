//! In-process `BookingStore` used when no database is configured and by the
//! integration suites.
//!
//! All state sits behind one async mutex, so every transaction is serialised.
//! Each transaction validates all of its conditions before it mutates
//! anything, which gives the same all-or-nothing outcome as the SQL adapter.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::ports::{BookingStore, BookingStoreError};
use crate::domain::{
    Booking, BookingKey, BookingLocator, BookingTransaction, PlaceId, PlaceKey, PublicBookingId,
    PublicBookingKey, SlotId, SlotKey, TokenCheck, TokenRecord, TokenRetention, TransactionToken,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SlotRow {
    allowed: u32,
    available: u32,
    last_update: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    slots: HashMap<(PlaceKey, SlotKey), SlotRow>,
    bookings: HashMap<(PlaceKey, BookingKey), BookingLocator>,
    public_index: HashMap<PublicBookingKey, (PlaceKey, BookingKey)>,
    tokens: HashMap<TransactionToken, TokenRecord>,
}

impl State {
    fn create(&mut self, booking: &Booking, at: DateTime<Utc>) -> Result<(), BookingStoreError> {
        let row_key = (booking.place_key(), booking.booking_key());
        let public_key = booking.public_key();
        if self.bookings.contains_key(&row_key) || self.public_index.contains_key(&public_key) {
            return Err(conflict());
        }
        let slot = self
            .slots
            .get_mut(&(booking.place_key(), booking.slot_key()))
            .filter(|slot| slot.available >= booking.people())
            .ok_or_else(conflict)?;

        slot.available -= booking.people();
        slot.last_update = at;
        self.public_index.insert(public_key, row_key.clone());
        self.bookings.insert(row_key, booking.locator());
        Ok(())
    }

    fn release(&mut self, locator: &BookingLocator, at: DateTime<Utc>) -> Result<(), BookingStoreError> {
        let row_key = (locator.place_key(), locator.booking_key.clone());
        if !self.bookings.contains_key(&row_key) {
            return Err(conflict());
        }
        let slot_key = (locator.place_key(), locator.slot_key());
        if let Some(slot) = self.slots.get(&slot_key) {
            if slot.available.saturating_add(locator.people) > slot.allowed {
                return Err(conflict());
            }
        }

        self.bookings.remove(&row_key);
        self.public_index.retain(|_, target| *target != row_key);
        if let Some(slot) = self.slots.get_mut(&slot_key) {
            slot.available += locator.people;
            slot.last_update = at;
        }
        Ok(())
    }
}

fn conflict() -> BookingStoreError {
    BookingStoreError::conflict("transaction conditions not met")
}

/// Booking store holding every row in process memory.
pub struct InMemoryBookingStore {
    state: Mutex<State>,
    clock: Arc<dyn Clock>,
    retention: TokenRetention,
}

impl InMemoryBookingStore {
    pub fn new(clock: Arc<dyn Clock>, retention: TokenRetention) -> Self {
        Self {
            state: Mutex::new(State::default()),
            clock,
            retention,
        }
    }

    /// Create or reset a slot with `allowed` places, all available.
    pub async fn insert_slot(&self, place_id: &PlaceId, slot_id: &SlotId, allowed: u32) {
        let mut state = self.state.lock().await;
        state.slots.insert(
            (PlaceKey::for_place(place_id), SlotKey::for_slot(slot_id)),
            SlotRow {
                allowed,
                available: allowed,
                last_update: self.clock.utc(),
            },
        );
    }

    /// Places still free in a slot, `None` when the slot does not exist.
    pub async fn available_places(&self, place_id: &PlaceId, slot_id: &SlotId) -> Option<u32> {
        let state = self.state.lock().await;
        state
            .slots
            .get(&(PlaceKey::for_place(place_id), SlotKey::for_slot(slot_id)))
            .map(|slot| slot.available)
    }

    pub async fn booking_count(&self) -> usize {
        self.state.lock().await.bookings.len()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn apply(
        &self,
        transaction: &BookingTransaction,
        token: &TransactionToken,
    ) -> Result<(), BookingStoreError> {
        let fingerprint = transaction
            .fingerprint()
            .map_err(|err| BookingStoreError::query(err.to_string()))?;
        let now = self.clock.utc();
        let mut state = self.state.lock().await;

        if let Some(record) = state.tokens.get(token) {
            match record.check(&fingerprint, now, self.retention.ttl()) {
                TokenCheck::Replay => {
                    debug!(token = token.as_str(), "transaction replayed");
                    return Ok(());
                }
                TokenCheck::Collision => {
                    return Err(BookingStoreError::conflict(
                        "transaction token already used for a different transaction",
                    ));
                }
                TokenCheck::Apply => {}
            }
        }

        match transaction {
            BookingTransaction::Create { booking } => state.create(booking, now)?,
            BookingTransaction::Release { locator, at } => state.release(locator, *at)?,
        }
        state.tokens.insert(
            token.clone(),
            TokenRecord {
                token: token.clone(),
                fingerprint,
                applied_at: now,
            },
        );
        Ok(())
    }

    async fn find_booking(
        &self,
        public_id: &PublicBookingId,
    ) -> Result<Option<BookingLocator>, BookingStoreError> {
        let state = self.state.lock().await;
        Ok(state
            .public_index
            .get(&PublicBookingKey::for_booking(public_id))
            .and_then(|row_key| state.bookings.get(row_key))
            .cloned())
    }

    async fn purge_expired_tokens(&self, ttl: Duration) -> Result<u64, BookingStoreError> {
        let now = self.clock.utc();
        let mut state = self.state.lock().await;
        let before = state.tokens.len();
        state.tokens.retain(|_, record| !record.is_expired(now, ttl));
        Ok(u64::try_from(before - state.tokens.len()).unwrap_or(u64::MAX))
    }
}
