//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! Every failure is recoverable at the caller: the command simply fails and
//! stock/ledger state is unchanged for that unit of work.

use std::fmt;

#[derive(Debug)]
pub enum LedgerError {
    /// Resource not found (unknown item name or id)
    NotFound,
    /// Validation error with message
    Validation(String),
    /// Borrow would drive an item's stock below zero
    InsufficientStock(String),
    /// Adjustment would push an item's stock above its total capacity
    CapacityExceeded(String),
    /// Return quantity exceeds the outstanding balance for the pair
    OverReturn(String),
    /// Database/persistence error
    Database(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::NotFound => write!(f, "Resource not found"),
            LedgerError::Validation(msg) => write!(f, "Validation error: {}", msg),
            LedgerError::InsufficientStock(msg) => write!(f, "Insufficient stock: {}", msg),
            LedgerError::CapacityExceeded(msg) => write!(f, "Capacity exceeded: {}", msg),
            LedgerError::OverReturn(msg) => write!(f, "Over-return: {}", msg),
            LedgerError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for LedgerError {}

// Conversion from SeaORM errors (used in the services layer)
impl From<sea_orm::DbErr> for LedgerError {
    fn from(e: sea_orm::DbErr) -> Self {
        LedgerError::Database(e.to_string())
    }
}
