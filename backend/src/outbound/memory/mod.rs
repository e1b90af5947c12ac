//! In-process adapters for development without a database and for tests.

mod in_memory_booking_store;

pub use in_memory_booking_store::InMemoryBookingStore;
