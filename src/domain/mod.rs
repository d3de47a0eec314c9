//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM, no Axum).
//! Only domain error types and the ledger vocabulary shared across services.

pub mod errors;

pub use errors::LedgerError;
