use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Form, Json};

use stockbook_infra::LedgerServiceError;
use stockbook_ledger::{BalanceForm, DerivedState, TradeForm};

use crate::app::{dto, errors, SharedLedger};

/// Current balance and stock.
pub async fn view(Extension(ledger): Extension<SharedLedger>) -> axum::response::Response {
    match errors::blocking(move || ledger.view()).await {
        Ok(state) => Json(dto::state_to_json(&state)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn record_purchase(
    Extension(ledger): Extension<SharedLedger>,
    Form(body): Form<TradeForm>,
) -> axum::response::Response {
    created(errors::blocking(move || ledger.record_purchase(body)).await)
}

pub async fn record_sale(
    Extension(ledger): Extension<SharedLedger>,
    Form(body): Form<TradeForm>,
) -> axum::response::Response {
    created(errors::blocking(move || ledger.record_sale(body)).await)
}

pub async fn adjust_balance(
    Extension(ledger): Extension<SharedLedger>,
    Form(body): Form<BalanceForm>,
) -> axum::response::Response {
    created(errors::blocking(move || ledger.adjust_balance(body)).await)
}

fn created(
    outcome: Result<Result<DerivedState, LedgerServiceError>, axum::response::Response>,
) -> axum::response::Response {
    match outcome {
        Ok(Ok(state)) => (StatusCode::CREATED, Json(dto::state_to_json(&state))).into_response(),
        Ok(Err(e)) => errors::service_error_to_response(e),
        Err(resp) => resp,
    }
}
