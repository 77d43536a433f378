//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use stockbook_infra::{EventLog, JsonFileEventLog, LedgerConfig, LedgerService};

pub mod dto;
pub mod errors;
pub mod routes;

/// Service shared by every handler. The store is type-erased so tests can
/// run the same router over an in-memory log.
pub type SharedLedger = Arc<LedgerService<Arc<dyn EventLog>>>;

/// Build the full HTTP router over the JSON document named in `config`.
pub fn build_app(config: LedgerConfig) -> Router {
    let store: Arc<dyn EventLog> = Arc::new(JsonFileEventLog::new(config.data_file.clone()));
    build_app_with_store(config, store)
}

/// Same router as [`build_app`], over an arbitrary event log.
pub fn build_app_with_store(config: LedgerConfig, store: Arc<dyn EventLog>) -> Router {
    let ledger: SharedLedger = Arc::new(LedgerService::new(config, store));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(Extension(ledger)))
}
