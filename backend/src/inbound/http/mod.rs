//! HTTP inbound adapter exposing the booking REST endpoints.

use actix_web::web;

pub mod bookings;
pub mod error;
pub mod health;
pub mod state;

pub use crate::domain::ApiResult;

/// Mount the booking endpoints under `/api/v1`.
///
/// Expects an [`HttpState`](state::HttpState) in the app data.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(bookings::json_config()).service(
        web::scope("/api/v1")
            .service(bookings::create_booking)
            .service(bookings::cancel_booking),
    );
}
