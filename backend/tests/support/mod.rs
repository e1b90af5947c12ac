//! Helpers for the integration suites that run against embedded PostgreSQL.
//!
//! Integration tests compile as separate crates, so suites opt in with
//! `mod support;`. Suites that do not need a database leave it out.

pub mod cluster;
pub mod embedded_postgres;

pub use cluster::{handle_cluster_setup_failure, shared_cluster};
pub use embedded_postgres::provision_template_database;

/// Render a `postgres` error with the server message and SQLSTATE.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}
