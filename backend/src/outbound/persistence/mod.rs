//! PostgreSQL adapters built on Diesel, `diesel-async` and `bb8`.
//!
//! Row structs and table definitions stay private to this module; adapters
//! translate them into domain types and map database failures onto the
//! port error enums.
//!
//! ```ignore
//! use booking::outbound::persistence::{DbPool, DieselBookingStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/bookings")).await?;
//! let store = DieselBookingStore::new(pool, clock, TokenRetention::default());
//! ```

mod diesel_booking_store;
mod diesel_place_directory;
mod models;
mod pool;
mod schema;

pub use diesel_booking_store::DieselBookingStore;
pub use diesel_place_directory::DieselPlaceDirectory;
pub use pool::{DbPool, PoolConfig, PoolError};
