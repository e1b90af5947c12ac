//! Builders wiring adapters into the booking services.

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use booking::domain::ports::{
    BookingStore, EmailTransport, FixtureEmailTransport, FixturePlaceDirectory,
    FixtureSmsTransport, PlaceDirectory, SmsTransport,
};
use booking::domain::{
    BookingService, CancellationService, ConfirmationDispatcher, TokenRetention,
};
use booking::inbound::http::state::HttpState;
use booking::outbound::email::SmtpEmailTransport;
use booking::outbound::memory::InMemoryBookingStore;
use booking::outbound::persistence::{DieselBookingStore, DieselPlaceDirectory};
use booking::outbound::sms::HttpSmsTransport;

use super::ServerConfig;

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

fn build_email_transport(config: &ServerConfig) -> std::io::Result<Arc<dyn EmailTransport>> {
    match config.settings.smtp_relay() {
        Some(relay) => {
            info!(host = %relay.host, port = relay.port, "smtp relay configured");
            let transport =
                SmtpEmailTransport::new(relay).map_err(|err| io_error("smtp relay", err))?;
            Ok(Arc::new(transport))
        }
        None => {
            warn!("no smtp relay configured; confirmation emails are discarded");
            Ok(Arc::new(FixtureEmailTransport))
        }
    }
}

fn build_sms_transport(config: &ServerConfig) -> std::io::Result<Arc<dyn SmsTransport>> {
    let gateway = config
        .settings
        .sms_gateway()
        .map_err(|err| io_error("sms gateway", err))?;
    match gateway {
        Some(gateway) => {
            info!(endpoint = %gateway.endpoint, "sms gateway configured");
            let transport = HttpSmsTransport::new(gateway.endpoint, gateway.api_key, gateway.timeout)
                .map_err(|err| io_error("sms client", err))?;
            Ok(Arc::new(transport))
        }
        None => {
            warn!("no sms gateway configured; confirmation texts are discarded");
            Ok(Arc::new(FixtureSmsTransport))
        }
    }
}

fn build_place_directory(config: &ServerConfig) -> Arc<dyn PlaceDirectory> {
    match &config.db_pool {
        Some(pool) => Arc::new(DieselPlaceDirectory::new(pool.clone())),
        None => Arc::new(FixturePlaceDirectory),
    }
}

/// Periodically forget transaction tokens older than the retention window.
fn spawn_token_purge<S>(store: Arc<S>, retention: TokenRetention)
where
    S: BookingStore + 'static,
{
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(retention.ttl().max(Duration::from_secs(60)));
        loop {
            interval.tick().await;
            match store.purge_expired_tokens(retention.ttl()).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "transaction tokens purged"),
                Err(err) => warn!(error = %err, "transaction token purge failed"),
            }
        }
    });
}

fn services<S>(
    store: Arc<S>,
    sender: Arc<ConfirmationDispatcher>,
    clock: Arc<dyn Clock>,
    retention: TokenRetention,
) -> HttpState
where
    S: BookingStore + 'static,
{
    spawn_token_purge(Arc::clone(&store), retention);
    let bookings = BookingService::new(Arc::clone(&store), sender, Arc::clone(&clock));
    let cancellations = CancellationService::new(store, clock);
    HttpState::new(Arc::new(bookings), Arc::new(cancellations))
}

/// Build handler state from the configured adapters.
///
/// # Errors
/// Fails when a transport is misconfigured.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let retention = config.settings.token_retention();
    let confirmation = config
        .settings
        .confirmation()
        .map_err(|err| io_error("confirmation settings", err))?;
    let sender = Arc::new(ConfirmationDispatcher::new(
        build_email_transport(config)?,
        build_sms_transport(config)?,
        build_place_directory(config),
        confirmation,
    ));

    let state = match &config.db_pool {
        Some(pool) => {
            let store = Arc::new(DieselBookingStore::new(
                pool.clone(),
                Arc::clone(&clock),
                retention,
            ));
            services(store, sender, clock, retention)
        }
        None => {
            warn!("no database configured; bookings live in process memory");
            let store = Arc::new(InMemoryBookingStore::new(Arc::clone(&clock), retention));
            services(store, sender, clock, retention)
        }
    };
    Ok(web::Data::new(state))
}
