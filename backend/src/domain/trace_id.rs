//! Request correlation identifier.
//!
//! Held in task-local storage for the lifetime of one HTTP request. Domain
//! errors copy it into their payload and the booking endpoints fall back to it
//! as the transaction token. Task-locals do not follow `tokio::spawn`.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static TRACE_ID: TraceId;
}

/// UUID identifying one request.
///
/// # Examples
/// ```
/// use booking::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let trace_id: TraceId = "7d1f3c2a-0b4e-4f7a-9c65-1e2d3f4a5b6c"
///     .parse()
///     .expect("valid UUID");
/// let seen = TraceId::scope(trace_id, async { TraceId::current() }).await;
/// assert_eq!(seen, Some(trace_id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Identifier of the enclosing request, if one is in scope.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// The scoped identifier, or a new one outside any request.
    pub(crate) fn current_or_fresh() -> Self {
        Self::current().unwrap_or_else(Self::generate)
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub async fn scope<Fut: Future>(trace_id: TraceId, fut: Fut) -> Fut::Output {
        TRACE_ID.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scope_exposes_the_identifier() {
        let expected = TraceId::generate();
        let seen = TraceId::scope(expected, async { TraceId::current() }).await;
        assert_eq!(seen, Some(expected));
    }

    #[tokio::test]
    async fn current_or_fresh_prefers_the_scoped_identifier() {
        let expected = TraceId::generate();
        let seen = TraceId::scope(expected, async { TraceId::current_or_fresh() }).await;
        assert_eq!(seen, expected);
    }

    #[test]
    fn outside_a_request_there_is_no_identifier() {
        assert!(TraceId::current().is_none());
        assert_ne!(TraceId::current_or_fresh(), TraceId::current_or_fresh());
    }

    #[test]
    fn parsing_tolerates_surrounding_whitespace() {
        let uuid = Uuid::new_v4();
        let trace_id: TraceId = format!(" {uuid} ").parse().expect("parse uuid");
        assert_eq!(trace_id.as_uuid(), &uuid);
        assert_eq!(trace_id.to_string(), uuid.to_string());
    }
}
