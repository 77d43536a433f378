//! Append-only event log boundary.
//!
//! Defines the storage-facing abstraction for the ledger log plus the two
//! implementations: a JSON document on disk and an in-memory log for tests.

pub mod in_memory;
pub mod json_file;
pub mod r#trait;

pub use in_memory::InMemoryEventLog;
pub use json_file::JsonFileEventLog;
pub use r#trait::{EventLog, EventStoreError};
