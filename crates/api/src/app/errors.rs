use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockbook_infra::LedgerServiceError;

pub fn service_error_to_response(err: LedgerServiceError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        LedgerServiceError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
        LedgerServiceError::InsufficientStock { available, .. } => (
            StatusCode::CONFLICT,
            axum::Json(json!({
                "error": "insufficient_stock",
                "message": message,
                "available": available,
            })),
        )
            .into_response(),
        LedgerServiceError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        // The rejected event goes back to the client so it can be resubmitted.
        LedgerServiceError::Persistence { event, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({
                "error": "persistence_error",
                "message": message,
                "event": event,
            })),
        )
            .into_response(),
    }
}

/// Run ledger work that touches the log file off the async worker threads.
pub async fn blocking<F, T>(work: F) -> Result<T, axum::response::Response>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        tracing::error!(error = %e, "ledger task failed");
        json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "ledger task failed")
    })
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_service_errors_to_status_codes() {
        let cases = [
            (LedgerServiceError::InvalidInput("bad".into()), StatusCode::BAD_REQUEST),
            (
                LedgerServiceError::InsufficientStock {
                    product: "X".into(),
                    requested: 5,
                    available: 2,
                },
                StatusCode::CONFLICT,
            ),
            (LedgerServiceError::Conflict("stale".into()), StatusCode::CONFLICT),
        ];

        for (err, status) in cases {
            assert_eq!(service_error_to_response(err).status(), status);
        }
    }
}
