//! Booking service entry point: loads settings, prepares storage and serves
//! the booking API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use booking::inbound::http::health::HealthState;
use booking::outbound::persistence::DbPool;
use booking::settings::BookingSettings;
use server::{ServerConfig, create_server};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn run_migrations(database_url: &str) -> Result<usize> {
    let mut conn =
        PgConnection::establish(database_url).wrap_err("failed to connect for migrations")?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| eyre!("failed to run migrations: {err}"))?;
    Ok(applied.len())
}

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        BookingSettings::load().map_err(|err| eyre!("failed to load booking settings: {err}"))?;
    let bind_addr = settings.bind_addr()?;
    let mut config = ServerConfig::new(bind_addr, settings.clone());

    if let Some(pool_config) = settings.pool_config() {
        let url = pool_config.database_url().to_owned();
        let applied = actix_web::rt::task::spawn_blocking(move || run_migrations(&url))
            .await
            .wrap_err("migration task panicked")??;
        info!(applied, "database migrations applied");

        let pool = DbPool::new(pool_config)
            .await
            .wrap_err("failed to build database pool")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "booking service starting");
    create_server(health_state, config)?.await?;
    Ok(())
}
