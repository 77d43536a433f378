//! Ledger mutation pipeline (application-level orchestration).
//!
//! ```text
//! Form input
//!   ↓
//! 1. Load the full log
//!   ↓
//! 2. Rehydrate the ledger (replay into balance + stock)
//!   ↓
//! 3. Handle command (pure validation, produces one event)
//!   ↓
//! 4. Append + persist (whole log, expected-version check)
//!   ↓
//! 5. Re-derive state from the persisted log
//! ```
//!
//! Mutations are serialised by a process-wide write lock, so two requests in
//! this process can never interleave between steps 1 and 4. Writers in other
//! processes are caught by the expected-version check and reported as
//! [`LedgerServiceError::Conflict`].

use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use stockbook_core::{Aggregate, DomainError, ExpectedVersion, Timestamp};
use stockbook_events::Event;
use stockbook_ledger::{
    AdjustBalance, BalanceForm, DerivedState, HistoryEntry, Ledger, LedgerCommand, LedgerEvent,
    LineRange, LogEntry, RecordTrade, TradeForm, derive_balance_and_stock, history,
};

use crate::config::LedgerConfig;
use crate::event_store::{EventLog, EventStoreError, JsonFileEventLog};

/// Classified outcome of a rejected or failed mutation.
#[derive(Debug, Error)]
pub enum LedgerServiceError {
    /// Unparseable or out-of-range form field.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Sale larger than the stock derivable from the log.
    #[error("not enough stock for product '{product}' (requested: {requested}, available: {available})")]
    InsufficientStock {
        product: String,
        requested: i64,
        available: i64,
    },

    /// The log changed between load and append.
    #[error("concurrent write detected: {0}")]
    Conflict(String),

    /// The event was valid but could not be written. It is handed back so the
    /// caller can surface it and retry.
    #[error("failed to persist event: {source}")]
    Persistence {
        event: LedgerEvent,
        #[source]
        source: EventStoreError,
    },
}

impl From<DomainError> for LedgerServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::InvalidInput(msg) => LedgerServiceError::InvalidInput(msg),
            DomainError::InsufficientStock {
                product,
                requested,
                available,
            } => LedgerServiceError::InsufficientStock {
                product,
                requested,
                available,
            },
        }
    }
}

/// Orchestrates load → validate → append → persist → re-derive.
#[derive(Debug)]
pub struct LedgerService<S> {
    config: LedgerConfig,
    store: S,
    write_lock: Mutex<()>,
}

impl LedgerService<JsonFileEventLog> {
    /// Service over the JSON document named by `config.data_file`.
    pub fn from_config(config: LedgerConfig) -> Self {
        let store = JsonFileEventLog::new(config.data_file.clone());
        Self::new(config, store)
    }
}

impl<S> LedgerService<S>
where
    S: EventLog,
{
    pub fn new(config: LedgerConfig, store: S) -> Self {
        Self {
            config,
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn record_purchase(&self, form: TradeForm) -> Result<DerivedState, LedgerServiceError> {
        self.execute(LedgerCommand::RecordPurchase(RecordTrade {
            form,
            occurred_at: Timestamp::now(),
        }))
    }

    pub fn record_sale(&self, form: TradeForm) -> Result<DerivedState, LedgerServiceError> {
        self.execute(LedgerCommand::RecordSale(RecordTrade {
            form,
            occurred_at: Timestamp::now(),
        }))
    }

    pub fn adjust_balance(&self, form: BalanceForm) -> Result<DerivedState, LedgerServiceError> {
        self.execute(LedgerCommand::AdjustBalance(AdjustBalance {
            form,
            occurred_at: Timestamp::now(),
        }))
    }

    /// Run one command end to end and return the state derived from the
    /// persisted log.
    pub fn execute(&self, command: LedgerCommand) -> Result<DerivedState, LedgerServiceError> {
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let entries = self.store.load();
        let ledger = Ledger::rehydrate(&entries);

        let event = ledger.handle(&command).map_err(|e| {
            tracing::debug!(error = %e, "ledger command rejected");
            LedgerServiceError::from(e)
        })?;

        let expected = ExpectedVersion::Exact(ledger.version());
        match self.store.append(&event, expected) {
            Ok(entries) => {
                tracing::info!(
                    event_type = event.event_type(),
                    entries = entries.len(),
                    "ledger event appended"
                );
                Ok(derive_balance_and_stock(&entries))
            }
            Err(EventStoreError::Concurrency(msg)) => {
                tracing::warn!(error = %msg, "ledger log changed underneath append");
                Err(LedgerServiceError::Conflict(msg))
            }
            Err(source) => {
                tracing::error!(event_type = event.event_type(), error = %source, "failed to persist ledger event");
                Err(LedgerServiceError::Persistence { event, source })
            }
        }
    }

    /// Current balance and stock, always recomputed from the persisted log.
    pub fn view(&self) -> DerivedState {
        derive_balance_and_stock(&self.store.load())
    }

    /// Numbered history of the persisted log, filtered by position.
    pub fn history(&self, range: LineRange) -> Vec<HistoryEntry> {
        history(&self.store.load(), range, &Timestamp::now())
    }

    /// Raw persisted log.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.store.load()
    }
}
