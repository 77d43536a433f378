use std::sync::RwLock;

use stockbook_core::ExpectedVersion;
use stockbook_ledger::{LedgerEvent, LogEntry};

use super::r#trait::{EventLog, EventStoreError, check_version};

/// In-memory append-only log.
///
/// Intended for tests/dev. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    entries: RwLock<Vec<LogEntry>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing log (e.g. one containing malformed records).
    pub fn with_entries(entries: Vec<LogEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }
}

impl EventLog for InMemoryEventLog {
    fn load(&self) -> Vec<LogEntry> {
        match self.entries.read() {
            Ok(entries) => entries.clone(),
            Err(_) => {
                tracing::warn!("in-memory log lock poisoned; loading empty log");
                Vec::new()
            }
        }
    }

    fn append(
        &self,
        event: &LedgerEvent,
        expected: ExpectedVersion,
    ) -> Result<Vec<LogEntry>, EventStoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| EventStoreError::Unavailable("lock poisoned".to_string()))?;

        check_version(expected, entries.len())?;
        entries.push(LogEntry::Event(event.clone()));

        Ok(entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stockbook_ledger::BalanceOperation;

    fn deposit() -> LedgerEvent {
        LedgerEvent::balance(BalanceOperation::Add, dec!(5), None)
    }

    #[test]
    fn append_returns_full_log() {
        let log = InMemoryEventLog::new();
        log.append(&deposit(), ExpectedVersion::Exact(0)).unwrap();
        let all = log.append(&deposit(), ExpectedVersion::Exact(1)).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(log.load(), all);
    }

    #[test]
    fn stale_expectation_is_rejected_without_writing() {
        let log = InMemoryEventLog::new();
        log.append(&deposit(), ExpectedVersion::Any).unwrap();

        let err = log.append(&deposit(), ExpectedVersion::Exact(0)).unwrap_err();
        assert!(matches!(err, EventStoreError::Concurrency(_)));
        assert_eq!(log.load().len(), 1);
    }
}
