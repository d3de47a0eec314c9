use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::error_response;
use crate::domain::LedgerError;
use crate::infrastructure::AppState;
use crate::services::ledger_service::{self, BorrowLine, BorrowRequest};

#[derive(Deserialize)]
pub struct BorrowPayload {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub faculty: String,
    pub items: Vec<BorrowLine>,
    pub borrow_date: Option<String>,
    #[serde(default)]
    pub is_backdate: bool,
}

#[utoipa::path(
    post,
    path = "/api/borrow",
    responses(
        (status = 200, description = "Borrow recorded"),
        (status = 404, description = "Unknown equipment"),
        (status = 409, description = "Insufficient stock")
    )
)]
pub async fn borrow(
    State(state): State<AppState>,
    Json(payload): Json<BorrowPayload>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let backdate = if payload.is_backdate {
        let date = payload.borrow_date.clone().ok_or_else(|| {
            error_response(LedgerError::Validation(
                "borrow_date is required when is_backdate is set".to_string(),
            ))
        })?;
        Some(date)
    } else {
        None
    };

    let request = BorrowRequest {
        student_id: payload.student_id,
        faculty: payload.faculty,
        items: payload.items,
        backdate,
    };

    let records = ledger_service::borrow(state.db(), &state.locks, request, state.borrow_atomicity)
        .await
        .map_err(error_response)?;

    tracing::info!(count = records.len(), "borrow recorded");

    Ok(Json(
        json!({ "message": "Borrow recorded successfully", "records": records }),
    ))
}

#[derive(Deserialize)]
pub struct ReturnPayload {
    pub student_id: String,
    #[serde(default)]
    pub faculty: String,
    pub equipment: String,
    pub qty: i32,
}

#[utoipa::path(
    post,
    path = "/api/return",
    responses(
        (status = 200, description = "Return recorded"),
        (status = 409, description = "Return exceeds outstanding balance")
    )
)]
pub async fn return_item(
    State(state): State<AppState>,
    Json(payload): Json<ReturnPayload>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let record = ledger_service::return_item(
        state.db(),
        &state.locks,
        &payload.student_id,
        &payload.faculty,
        &payload.equipment,
        payload.qty,
    )
    .await
    .map_err(error_response)?;

    match record {
        Some(entry) => Ok(Json(
            json!({ "message": "Return recorded successfully", "record": entry }),
        )),
        None => Ok(Json(
            json!({ "message": "Nothing to return", "record": Value::Null }),
        )),
    }
}

#[derive(Deserialize)]
pub struct StatPayload {
    pub equipment: String,
    pub qty: i32,
    pub effective_date: String,
}

#[utoipa::path(
    post,
    path = "/api/stat",
    responses(
        (status = 200, description = "Statistics entry recorded"),
        (status = 404, description = "Unknown equipment")
    )
)]
pub async fn record_stat(
    State(state): State<AppState>,
    Json(payload): Json<StatPayload>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let record = ledger_service::record_stat(
        state.db(),
        &payload.equipment,
        payload.qty,
        &payload.effective_date,
    )
    .await
    .map_err(error_response)?;

    Ok(Json(
        json!({ "message": "Statistics entry recorded", "record": record }),
    ))
}
