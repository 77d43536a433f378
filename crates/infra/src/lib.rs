//! Infrastructure layer: log storage, configuration, and the ledger service.

pub mod config;
pub mod event_store;
pub mod ledger_service;


pub use config::{ConfigError, LedgerConfig};
pub use event_store::{EventLog, EventStoreError, InMemoryEventLog, JsonFileEventLog};
pub use ledger_service::{LedgerService, LedgerServiceError};
