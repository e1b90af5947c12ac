//! PostgreSQL-backed `PlaceDirectory` reading the `places` table.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{PlaceDirectory, PlaceDirectoryError};
use crate::domain::{PlaceId, PlaceKey};

use super::pool::{DbPool, PoolError};
use super::schema::places;

/// Diesel-backed implementation of the `PlaceDirectory` port.
#[derive(Clone)]
pub struct DieselPlaceDirectory {
    pool: DbPool,
}

impl DieselPlaceDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PlaceDirectoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            PlaceDirectoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: DieselError) -> PlaceDirectoryError {
    debug!(error = %error, "place lookup failed");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PlaceDirectoryError::connection("database connection error")
        }
        _ => PlaceDirectoryError::query("database error"),
    }
}

#[async_trait]
impl PlaceDirectory for DieselPlaceDirectory {
    async fn place_name(&self, place_id: &PlaceId) -> Result<Option<String>, PlaceDirectoryError> {
        let place_key = PlaceKey::for_place(place_id);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        places::table
            .find(place_key.as_str())
            .select(places::name)
            .first::<String>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_failures_are_connection_errors() {
        let error = map_pool_error(PoolError::checkout("pool exhausted"));
        assert_eq!(error, PlaceDirectoryError::connection("pool exhausted"));
    }

    #[test]
    fn other_diesel_failures_are_query_errors() {
        let error = map_diesel_error(DieselError::RollbackTransaction);
        assert_eq!(error, PlaceDirectoryError::query("database error"));
    }
}
