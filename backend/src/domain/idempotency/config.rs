//! Retention window for transaction tokens.

use std::time::Duration;

/// How long a transaction token deduplicates re-deliveries.
///
/// # Example
/// ```
/// use booking::domain::TokenRetention;
/// use std::time::Duration;
///
/// assert_eq!(TokenRetention::default().ttl(), Duration::from_secs(600));
/// assert_eq!(TokenRetention::from_secs(5).ttl(), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRetention {
    ttl: Duration,
}

impl TokenRetention {
    const DEFAULT_TTL_SECS: u64 = 600;
    /// Shorter windows would expire before a client retry lands.
    const MIN_TTL_SECS: u64 = 60;
    const MAX_TTL_SECS: u64 = 24 * 3600;

    /// Clamp `secs` into the supported window.
    pub fn from_secs(secs: u64) -> Self {
        Self {
            ttl: Duration::from_secs(secs.clamp(Self::MIN_TTL_SECS, Self::MAX_TTL_SECS)),
        }
    }

    /// Use `secs` when configured, the default otherwise.
    pub fn from_setting(secs: Option<u64>) -> Self {
        Self::from_secs(secs.unwrap_or(Self::DEFAULT_TTL_SECS))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for TokenRetention {
    fn default() -> Self {
        Self::from_secs(Self::DEFAULT_TTL_SECS)
    }
}
