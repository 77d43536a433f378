//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level rejection of a candidate ledger event.
///
/// Keep this focused on deterministic, business failures (input validation,
/// stock invariants). Storage failures belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field was unparseable or out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A sale asked for more units than the log currently derives.
    #[error("not enough stock for product '{product}' (requested: {requested}, available: {available})")]
    InsufficientStock {
        product: String,
        requested: i64,
        available: i64,
    },
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn insufficient_stock(product: impl Into<String>, requested: i64, available: i64) -> Self {
        Self::InsufficientStock {
            product: product.into(),
            requested,
            available,
        }
    }
}
