use serde::Deserialize;

use stockbook_ledger::{DerivedState, HistoryEntry, LineRange};

// -------------------------
// Request DTOs
// -------------------------

/// `?lineFrom=&lineTo=` on the history listing.
///
/// Values are kept as text so an unparseable bound is ignored instead of
/// failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(rename = "lineFrom")]
    pub line_from: Option<String>,
    #[serde(rename = "lineTo")]
    pub line_to: Option<String>,
}

impl HistoryQuery {
    pub fn range(&self) -> LineRange {
        LineRange {
            from: parse_line(self.line_from.as_deref()),
            to: parse_line(self.line_to.as_deref()),
        }
    }
}

fn parse_line(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse().ok())
}

// -------------------------
// Response mapping
// -------------------------

pub fn state_to_json(state: &DerivedState) -> serde_json::Value {
    serde_json::json!({
        "balance": state.balance.to_string(),
        "stock": state
            .stock
            .iter()
            .map(|(product, qty)| (product.to_string(), serde_json::json!(qty)))
            .collect::<serde_json::Map<_, _>>(),
    })
}

pub fn history_to_json(items: Vec<HistoryEntry>) -> serde_json::Value {
    serde_json::json!({ "items": items })
}
