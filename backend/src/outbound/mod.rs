//! Outbound adapters implementing the domain's driven ports.
//!
//! - **memory**: in-process booking store for development and tests
//! - **persistence**: PostgreSQL store and place directory using Diesel
//! - **email**: SMTP confirmation delivery via lettre
//! - **sms**: HTTP gateway confirmation delivery via reqwest
//!
//! Adapters translate between domain types and wire or row formats and map
//! infrastructure failures onto port errors. They hold no booking rules.

pub mod email;
pub mod memory;
pub mod persistence;
pub mod sms;
