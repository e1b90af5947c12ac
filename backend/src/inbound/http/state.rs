//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see the driving ports,
//! so they can be tested against mocks without a store or a mail relay.

use std::sync::Arc;

use crate::domain::ports::{
    BookingCancellation, BookingCommand, FixtureBookingCancellation, FixtureBookingCommand,
};

/// Dependency bundle for booking handlers.
#[derive(Clone)]
pub struct HttpState {
    pub bookings: Arc<dyn BookingCommand>,
    pub cancellations: Arc<dyn BookingCancellation>,
}

impl HttpState {
    pub fn new(
        bookings: Arc<dyn BookingCommand>,
        cancellations: Arc<dyn BookingCancellation>,
    ) -> Self {
        Self {
            bookings,
            cancellations,
        }
    }

    /// State backed by fixtures that validate input but persist nothing.
    ///
    /// # Examples
    /// ```
    /// use booking::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::fixtures();
    /// let _shared = state.clone();
    /// ```
    pub fn fixtures() -> Self {
        Self::new(
            Arc::new(FixtureBookingCommand),
            Arc::new(FixtureBookingCancellation),
        )
    }
}
