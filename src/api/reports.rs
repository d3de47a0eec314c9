use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::error_response;
use crate::domain::LedgerError;
use crate::services::ledger_service::TxAction;
use crate::services::report_service;

#[utoipa::path(
    get,
    path = "/api/pending-returns",
    responses(
        (status = 200, description = "Outstanding balances grouped by student")
    )
)]
pub async fn pending_returns(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let students = report_service::pending_returns(&db)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({ "students": students })))
}

#[derive(Deserialize)]
pub struct BorrowRecordsQuery {
    /// Defaults to today when omitted.
    pub date: Option<String>,
}

pub async fn borrow_records(
    State(db): State<DatabaseConnection>,
    Query(query): Query<BorrowRecordsQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let date = query
        .date
        .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());

    let records = report_service::history_for_date(&db, &date)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({ "date": date, "records": records })))
}

#[derive(Deserialize)]
pub struct UsageStatsQuery {
    pub from: String,
    pub to: String,
    pub action: Option<String>,
}

pub async fn usage_stats(
    State(db): State<DatabaseConnection>,
    Query(query): Query<UsageStatsQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let action = match query.action.as_deref() {
        Some(s) => Some(TxAction::parse(s).ok_or_else(|| {
            error_response(LedgerError::Validation(format!("unknown action '{}'", s)))
        })?),
        None => None,
    };

    let stats = report_service::usage_stats(&db, &query.from, &query.to, action)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({ "rows": stats.rows, "total": stats.total })))
}
