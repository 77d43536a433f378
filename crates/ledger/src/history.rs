//! Numbered, human-readable listing of the log.

use serde::Serialize;

use stockbook_core::Timestamp;

use crate::event::{BalanceOperation, LedgerEvent, LogEntry, Trade};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperationKind {
    Purchase,
    Sale,
    #[serde(rename = "Balance Add")]
    BalanceAdd,
    #[serde(rename = "Balance Subtract")]
    BalanceSubtract,
    Unknown,
}

impl core::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            OperationKind::Purchase => "Purchase",
            OperationKind::Sale => "Sale",
            OperationKind::BalanceAdd => "Balance Add",
            OperationKind::BalanceSubtract => "Balance Subtract",
            OperationKind::Unknown => "Unknown",
        })
    }
}

/// One row of the history view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// 1-based position in the log.
    pub position: u64,
    pub operation: OperationKind,
    pub details: String,
    /// `YYYY-MM-DD`.
    pub date: String,
}

/// Optional bounds over 1-based log positions.
///
/// | from | to | kept |
/// |------|----|------|
/// | `a`  | `b`, `a <= b` | `a..=b` |
/// | `a`  | `b`, `a > b`  | everything |
/// | `a`  | –  | `a..` |
/// | –    | `b` | `..=b` |
/// | –    | –  | everything |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineRange {
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl LineRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from: u64, to: u64) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Whether both bounds are present and ordered.
    pub fn is_closed(&self) -> bool {
        matches!((self.from, self.to), (Some(from), Some(to)) if from <= to)
    }

    pub fn contains(&self, position: u64) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from <= to => (from..=to).contains(&position),
            (Some(_), Some(_)) => true,
            (Some(from), None) => position >= from,
            (None, Some(to)) => position <= to,
            (None, None) => true,
        }
    }
}

/// Describe every log entry in order, keeping those inside `range`.
///
/// Entries without a timestamp are dated `today`.
pub fn history(entries: &[LogEntry], range: LineRange, today: &Timestamp) -> Vec<HistoryEntry> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| (idx as u64 + 1, entry))
        .filter(|(position, _)| range.contains(*position))
        .map(|(position, entry)| {
            let (operation, details) = describe(entry);
            let date = match entry.timestamp() {
                Some(raw) => Timestamp::from(raw.to_string()).date().to_string(),
                None => today.date().to_string(),
            };
            HistoryEntry {
                position,
                operation,
                details,
                date,
            }
        })
        .collect()
}

fn describe(entry: &LogEntry) -> (OperationKind, String) {
    let Some(event) = entry.as_event() else {
        return (OperationKind::Unknown, "Unknown".to_string());
    };

    match event {
        LedgerEvent::Purchase(t) => (OperationKind::Purchase, describe_trade(t)),
        LedgerEvent::Sale(t) => (OperationKind::Sale, describe_trade(t)),
        LedgerEvent::BalanceAdd(_) | LedgerEvent::BalanceSubtract(_) | LedgerEvent::LegacyBalance(_) => {
            match event.as_adjustment() {
                Some((BalanceOperation::Add, amount)) => {
                    (OperationKind::BalanceAdd, format!("${amount:.2} added"))
                }
                Some((BalanceOperation::Subtract, amount)) => {
                    (OperationKind::BalanceSubtract, format!("${amount:.2} subtracted"))
                }
                None => (OperationKind::Unknown, "Unknown".to_string()),
            }
        }
    }
}

fn describe_trade(t: &Trade) -> String {
    format!("{}, {} units at ${:.2}", t.product, t.quantity, t.unit_price)
}
