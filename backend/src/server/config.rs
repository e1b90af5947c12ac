//! HTTP server configuration object.

use std::net::SocketAddr;

use booking::outbound::persistence::DbPool;
use booking::settings::BookingSettings;

/// Everything `create_server` needs besides the health flags.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) settings: BookingSettings,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, settings: BookingSettings) -> Self {
        Self {
            bind_addr,
            settings,
            db_pool: None,
        }
    }

    /// Use PostgreSQL for bookings and place names instead of the in-process
    /// store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
