pub mod equipment;
pub mod health;
pub mod ledger;
pub mod reports;

use axum::{
    Json,
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};

use crate::domain::LedgerError;
use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Stock & staff catalog management
        .route("/stock", get(equipment::list_stock))
        .route("/equipment", post(equipment::create_equipment))
        .route("/equipment/stats", get(reports::usage_stats))
        .route(
            "/equipment/:id",
            put(equipment::update_equipment).delete(equipment::delete_equipment),
        )
        // Ledger commands
        .route("/borrow", post(ledger::borrow))
        .route("/return", post(ledger::return_item))
        .route("/stat", post(ledger::record_stat))
        // Query views
        .route("/pending-returns", get(reports::pending_returns))
        .route("/borrow-records", get(reports::borrow_records))
        .with_state(state)
}

/// Map a domain error onto an HTTP status and JSON error body.
pub(crate) fn error_response(err: LedgerError) -> (StatusCode, Json<Value>) {
    let (status, code) = match &err {
        LedgerError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        LedgerError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        LedgerError::InsufficientStock(_) => (StatusCode::CONFLICT, "insufficient_stock"),
        LedgerError::CapacityExceeded(_) => (StatusCode::CONFLICT, "capacity_exceeded"),
        LedgerError::OverReturn(_) => (StatusCode::CONFLICT, "over_return"),
        LedgerError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
    };

    (status, Json(json!({ "error": err.to_string(), "code": code })))
}
