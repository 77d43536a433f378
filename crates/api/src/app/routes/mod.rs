use axum::{
    routing::{get, post},
    Router,
};

pub mod history;
pub mod ledger;
pub mod system;

/// Router for the ledger endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/", get(ledger::view))
        .route("/purchase", post(ledger::record_purchase))
        .route("/sale", post(ledger::record_sale))
        .route("/balance", post(ledger::adjust_balance))
        .route("/history", get(history::list))
        .route("/history/:from/:to", get(history::list_range))
}
