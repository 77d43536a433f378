//! Ledger event contract shared by the domain and storage layers.

pub mod event;

pub use event::Event;
