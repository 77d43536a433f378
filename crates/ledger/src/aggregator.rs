//! Replay of the log into balance and stock.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use stockbook_core::ProductName;
use stockbook_events::Event;

use crate::event::{BalanceOperation, LedgerEvent, LogEntry};

/// Balance and per-product stock obtained by replaying the log.
///
/// Never persisted; recomputed from the full log on every read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedState {
    pub balance: Decimal,
    pub stock: BTreeMap<ProductName, i64>,
}

/// An event whose cash movement does not fit the decimal range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("arithmetic overflow while applying '{event_type}'")]
pub struct ArithmeticOverflow {
    pub event_type: &'static str,
}

impl DerivedState {
    /// Units of `product` currently on hand (0 when never traded).
    pub fn available(&self, product: &ProductName) -> i64 {
        self.stock.get(product).copied().unwrap_or(0)
    }

    /// Fold one event into the state.
    ///
    /// Either the whole event is applied or, on overflow, nothing is.
    /// Stock is not clamped: historical sales may drive it below zero.
    pub fn apply(&mut self, event: &LedgerEvent) -> Result<(), ArithmeticOverflow> {
        let overflow = || ArithmeticOverflow {
            event_type: event.event_type(),
        };

        match event {
            LedgerEvent::Purchase(t) => {
                let total = t.line_total().ok_or_else(overflow)?;
                self.balance = self.balance.checked_sub(total).ok_or_else(overflow)?;
                *self.stock.entry(t.product.clone()).or_insert(0) += i64::from(t.quantity);
            }
            LedgerEvent::Sale(t) => {
                let total = t.line_total().ok_or_else(overflow)?;
                self.balance = self.balance.checked_add(total).ok_or_else(overflow)?;
                *self.stock.entry(t.product.clone()).or_insert(0) -= i64::from(t.quantity);
            }
            LedgerEvent::BalanceAdd(_)
            | LedgerEvent::BalanceSubtract(_)
            | LedgerEvent::LegacyBalance(_) => {
                if let Some((operation, amount)) = event.as_adjustment() {
                    self.balance = match operation {
                        BalanceOperation::Add => self.balance.checked_add(amount),
                        BalanceOperation::Subtract => self.balance.checked_sub(amount),
                    }
                    .ok_or_else(overflow)?;
                }
            }
        }

        Ok(())
    }
}

/// Replay `entries` in order into a fresh [`DerivedState`].
///
/// Malformed records and events that overflow are logged and skipped; they
/// never abort the replay.
pub fn derive_balance_and_stock<'a, I>(entries: I) -> DerivedState
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut state = DerivedState::default();

    for (idx, entry) in entries.into_iter().enumerate() {
        let position = idx + 1;
        match entry {
            LogEntry::Event(event) | LogEntry::Recorded { event, .. } => {
                if let Err(e) = state.apply(event) {
                    tracing::warn!(position, error = %e, "malformed entry skipped");
                }
            }
            LogEntry::Malformed(raw) => {
                tracing::warn!(position, entry = %raw, "malformed entry skipped");
            }
        }
    }

    state
}
