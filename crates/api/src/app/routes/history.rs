use axum::{
    extract::{Extension, Path, Query},
    response::IntoResponse,
    Json,
};

use stockbook_ledger::LineRange;

use crate::app::{dto, errors, SharedLedger};

pub async fn list(
    Extension(ledger): Extension<SharedLedger>,
    Query(query): Query<dto::HistoryQuery>,
) -> axum::response::Response {
    respond(ledger, query.range()).await
}

/// `/history/:from/:to`. An inverted path range defers to the query string.
pub async fn list_range(
    Extension(ledger): Extension<SharedLedger>,
    Path((from, to)): Path<(u64, u64)>,
    Query(query): Query<dto::HistoryQuery>,
) -> axum::response::Response {
    let range = LineRange::between(from, to);
    let range = if range.is_closed() { range } else { query.range() };

    respond(ledger, range).await
}

async fn respond(ledger: SharedLedger, range: LineRange) -> axum::response::Response {
    match errors::blocking(move || ledger.history(range)).await {
        Ok(items) => Json(dto::history_to_json(items)).into_response(),
        Err(resp) => resp,
    }
}
