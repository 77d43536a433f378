//! Ledger domain module (event-sourced).
//!
//! Business rules for the purchase/sale/balance ledger, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod aggregator;
pub mod event;
pub mod history;
pub mod ledger;
pub mod validator;

pub use aggregator::{ArithmeticOverflow, DerivedState, derive_balance_and_stock};
pub use event::{Adjustment, BalanceOperation, LedgerEvent, LegacyAdjustment, LogEntry, Trade, is_storable};
pub use history::{HistoryEntry, LineRange, OperationKind, history};
pub use ledger::{AdjustBalance, Ledger, LedgerCommand, RecordTrade};
pub use validator::{BalanceForm, TradeForm, validate_balance_op, validate_purchase, validate_sale};
