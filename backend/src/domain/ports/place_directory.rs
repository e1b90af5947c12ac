//! Port for place display information.

use async_trait::async_trait;

use crate::domain::PlaceId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by place directory adapters.
    pub enum PlaceDirectoryError {
        Connection { message: String } => "place directory connection failed: {message}",
        Query { message: String } => "place directory query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaceDirectory: Send + Sync {
    /// Display name of a place, `None` when the place has no info row.
    async fn place_name(&self, place_id: &PlaceId) -> Result<Option<String>, PlaceDirectoryError>;
}

/// Directory that knows no places.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePlaceDirectory;

#[async_trait]
impl PlaceDirectory for FixturePlaceDirectory {
    async fn place_name(&self, _place_id: &PlaceId) -> Result<Option<String>, PlaceDirectoryError> {
        Ok(None)
    }
}
