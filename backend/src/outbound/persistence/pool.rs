//! bb8 pool of `diesel-async` PostgreSQL connections.
//!
//! A booking write holds one connection for the length of its transaction.
//! Requests racing for the last places of a slot therefore queue on checkout,
//! and the checkout timeout bounds how long they wait.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

use crate::domain::ports::define_port_error;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);
const MIN_IDLE_CONNECTIONS: u32 = 2;

define_port_error! {
    /// Pool construction and checkout failures.
    pub enum PoolError {
        Checkout { message: String } => "no database connection available: {message}",
        Build { message: String } => "database pool could not start: {message}",
    }
}

/// Where the booking database lives and how many connections to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    database_url: String,
    max_connections: u32,
    checkout_timeout: Duration,
}

impl PoolConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            checkout_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    /// Upper bound on open connections; zero is raised to one.
    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    pub fn checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    fn min_idle(&self) -> u32 {
        MIN_IDLE_CONNECTIONS.min(self.max_connections)
    }
}

/// Shared handle to the pool; clones are cheap.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool and open the idle connections.
    ///
    /// # Errors
    /// [`PoolError::Build`] when the URL is invalid or the database refuses
    /// the initial connections.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url());
        let inner = Pool::builder()
            .max_size(config.max_connections)
            .min_idle(Some(config.min_idle()))
            .connection_timeout(config.checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self { inner })
    }

    /// # Errors
    /// [`PoolError::Checkout`] when no connection frees up in time.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const URL: &str = "postgres://localhost/bookings";

    #[rstest]
    fn new_configs_use_the_defaults() {
        let config = PoolConfig::new(URL);

        assert_eq!(config.database_url(), URL);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.checkout_timeout, DEFAULT_CHECKOUT_TIMEOUT);
        assert_eq!(config.min_idle(), 2);
    }

    #[rstest]
    #[case(0, 1, 1)]
    #[case(1, 1, 1)]
    #[case(32, 32, 2)]
    fn idle_connections_never_exceed_the_maximum(
        #[case] requested: u32,
        #[case] max: u32,
        #[case] idle: u32,
    ) {
        let config = PoolConfig::new(URL).max_connections(requested);

        assert_eq!(config.max_connections, max);
        assert_eq!(config.min_idle(), idle);
    }

    #[rstest]
    fn checkout_timeout_is_overridable() {
        let config = PoolConfig::new(URL).checkout_timeout(Duration::from_millis(750));
        assert_eq!(config.checkout_timeout, Duration::from_millis(750));
    }

    #[rstest]
    fn checkout_errors_carry_the_pool_message() {
        assert_eq!(
            PoolError::checkout("timed out").to_string(),
            "no database connection available: timed out"
        );
    }
}
