use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use stockbook_core::ExpectedVersion;
use stockbook_ledger::{LedgerEvent, LogEntry};

/// Event log operation error.
///
/// These are **infrastructure errors** (storage, concurrency) as opposed to
/// domain rejections (validation, stock).
#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("failed to write log at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize log: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("log unavailable: {0}")]
    Unavailable(String),
}

/// Append-only ledger log: the single source of truth.
///
/// ## Load Semantics
///
/// `load()` never fails. A missing store is an empty log; an unreadable or
/// corrupt one is logged and also treated as empty, so the application always
/// starts from a valid state.
///
/// ## Append Semantics
///
/// `append()`:
/// - checks the current log length against `expected`
/// - pushes the event after every existing entry
/// - persists the **whole** log (no partial writes)
/// - returns the new full log
///
/// Malformed records already in the log are carried through untouched.
pub trait EventLog: Send + Sync {
    /// Load the full log in append order.
    fn load(&self) -> Vec<LogEntry>;

    /// Append one event and persist the resulting log.
    fn append(
        &self,
        event: &LedgerEvent,
        expected: ExpectedVersion,
    ) -> Result<Vec<LogEntry>, EventStoreError>;
}

impl<S> EventLog for Arc<S>
where
    S: EventLog + ?Sized,
{
    fn load(&self) -> Vec<LogEntry> {
        (**self).load()
    }

    fn append(
        &self,
        event: &LedgerEvent,
        expected: ExpectedVersion,
    ) -> Result<Vec<LogEntry>, EventStoreError> {
        (**self).append(event, expected)
    }
}

pub(crate) fn check_version(expected: ExpectedVersion, current: usize) -> Result<(), EventStoreError> {
    let current = current as u64;
    if expected.matches(current) {
        Ok(())
    } else {
        Err(EventStoreError::Concurrency(format!(
            "expected {expected} entries, found {current}"
        )))
    }
}
