//! Application state shared across all handlers

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::services::ledger_service::{BorrowAtomicity, ItemLocks};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    db: DatabaseConnection,
    /// Per-item-name critical sections for ledger commands
    pub locks: Arc<ItemLocks>,
    /// How multi-line borrow submissions commit
    pub borrow_atomicity: BorrowAtomicity,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_atomicity(db, BorrowAtomicity::AllOrNothing)
    }

    pub fn with_atomicity(db: DatabaseConnection, borrow_atomicity: BorrowAtomicity) -> Self {
        Self {
            db,
            locks: Arc::new(ItemLocks::new()),
            borrow_atomicity,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl AsRef<DatabaseConnection> for AppState {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Allow handlers that only read to extract the bare DatabaseConnection
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
