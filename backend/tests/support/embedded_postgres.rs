//! Per-test booking databases cloned from a migrated template.
//!
//! The template is named after a hash of `migrations/`, so editing a
//! migration produces a fresh template instead of reusing a stale schema.
//! Fixture rows are written with `postgres` directly; the store under test
//! only ever sees them through its own queries.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use booking::domain::ports::BookingStoreError;
use booking::domain::{PlaceId, PlaceKey, SlotId, SlotKey};
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::{Client, NoTls};
use uuid::Uuid;

use super::format_postgres_error;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
const TEMPLATE_NAME_PREFIX: &str = "booking_template";

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn template_database_name() -> Result<String, BookingStoreError> {
    let migrations = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let hash = hash_directory(migrations)
        .map_err(|err| BookingStoreError::query(format!("hash migrations: {err}")))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, BookingStoreError> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| BookingStoreError::query(format!("template check: {err:?}")))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| BookingStoreError::query(format!("create template: {err:?}")))?;
        migrate_schema(&cluster.connection().database_url(&template_name))?;
    }
    Ok(template_name)
}

/// Clone the migrated template into a database owned by one test.
///
/// The database is dropped when the returned handle goes out of scope.
pub fn provision_template_database(
    cluster: &ClusterHandle,
) -> Result<TemporaryDatabase, BookingStoreError> {
    let template_name = ensure_template_database(cluster)?;
    let db_name = format!("test_{}", Uuid::new_v4().simple());
    cluster
        .temporary_database_from_template(db_name.as_str(), template_name.as_str())
        .map_err(|err| BookingStoreError::query(format!("create from template: {err:?}")))
}

pub fn migrate_schema(url: &str) -> Result<(), BookingStoreError> {
    let mut conn = PgConnection::establish(url)
        .map_err(|err| BookingStoreError::connection(format!("{err:?}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| BookingStoreError::query(format!("migration: {err:?}")))?;
    Ok(())
}

fn connect(url: &str) -> Result<Client, BookingStoreError> {
    Client::connect(url, NoTls)
        .map_err(|err| BookingStoreError::connection(format_postgres_error(&err)))
}

/// Insert a place row and one of its slots with `capacity` free places.
pub fn seed_slot(
    url: &str,
    place_id: &PlaceId,
    slot_id: &SlotId,
    capacity: i32,
) -> Result<(), BookingStoreError> {
    let place_key = PlaceKey::for_place(place_id);
    let slot_key = SlotKey::for_slot(slot_id);
    let mut client = connect(url)?;
    client
        .execute(
            "INSERT INTO places (place_key, name) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            &[&place_key.as_str(), &place_id.to_string()],
        )
        .map_err(|err| BookingStoreError::query(format_postgres_error(&err)))?;
    client
        .execute(
            "INSERT INTO slots (place_key, slot_key, allowed_places, available_places) \
             VALUES ($1, $2, $3, $3)",
            &[&place_key.as_str(), &slot_key.as_str(), &capacity],
        )
        .map_err(|err| BookingStoreError::query(format_postgres_error(&err)))?;
    Ok(())
}

/// Free places left in a slot, or `None` when the slot row is missing.
pub fn available_places(
    url: &str,
    place_id: &PlaceId,
    slot_id: &SlotId,
) -> Result<Option<i32>, BookingStoreError> {
    let place_key = PlaceKey::for_place(place_id);
    let slot_key = SlotKey::for_slot(slot_id);
    let row = connect(url)?
        .query_opt(
            "SELECT available_places FROM slots WHERE place_key = $1 AND slot_key = $2",
            &[&place_key.as_str(), &slot_key.as_str()],
        )
        .map_err(|err| BookingStoreError::query(format_postgres_error(&err)))?;
    Ok(row.map(|row| row.get(0)))
}

/// Number of rows in `table`.
pub fn count_rows(url: &str, table: &str) -> Result<i64, BookingStoreError> {
    let row = connect(url)?
        .query_one(&format!("SELECT COUNT(*) FROM {table}"), &[])
        .map_err(|err| BookingStoreError::query(format_postgres_error(&err)))?;
    Ok(row.get(0))
}
