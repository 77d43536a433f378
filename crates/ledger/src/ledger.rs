use serde::{Deserialize, Serialize};

use stockbook_core::{Aggregate, DomainError, Timestamp};

use crate::aggregator::{DerivedState, derive_balance_and_stock};
use crate::event::{LedgerEvent, LogEntry};
use crate::validator::{BalanceForm, TradeForm, validate_balance_op, validate_purchase, validate_sale};

/// Command: record a purchase or a sale from raw form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTrade {
    pub form: TradeForm,
    pub occurred_at: Timestamp,
}

/// Command: add to or subtract from the cash balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustBalance {
    pub form: BalanceForm,
    pub occurred_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCommand {
    RecordPurchase(RecordTrade),
    RecordSale(RecordTrade),
    AdjustBalance(AdjustBalance),
}

/// Aggregate root: the whole ledger, rebuilt from its log on every command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    state: DerivedState,
    version: u64,
}

impl Ledger {
    /// Empty ledger (zero balance, no stock).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rebuild from the full log. Every record, malformed or not, counts
    /// towards `version`, so it always equals the log length.
    pub fn rehydrate(entries: &[LogEntry]) -> Self {
        Self {
            state: derive_balance_and_stock(entries),
            version: entries.len() as u64,
        }
    }

    pub fn state(&self) -> &DerivedState {
        &self.state
    }
}

impl Aggregate for Ledger {
    type Command = LedgerCommand;
    type Event = LedgerEvent;
    type Error = DomainError;

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        if let Err(e) = self.state.apply(event) {
            tracing::warn!(error = %e, "malformed entry skipped");
        }

        // One log entry per applied event, even when it was skipped.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Self::Event, Self::Error> {
        match command {
            LedgerCommand::RecordPurchase(cmd) => {
                validate_purchase(&cmd.form, cmd.occurred_at.clone())
            }
            LedgerCommand::RecordSale(cmd) => {
                validate_sale(&cmd.form, &self.state, cmd.occurred_at.clone())
            }
            LedgerCommand::AdjustBalance(cmd) => {
                validate_balance_op(&cmd.form, cmd.occurred_at.clone())
            }
        }
    }
}
