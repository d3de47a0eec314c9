use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::error_response;
use crate::models::item::ItemDto;
use crate::services::stock_service;

#[utoipa::path(
    get,
    path = "/api/stock",
    responses(
        (status = 200, description = "Current stock levels for all items")
    )
)]
pub async fn list_stock(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let items = stock_service::list_items(&db).await.map_err(error_response)?;

    Ok(Json(json!({
        "total": items.len(),
        "items": items
    })))
}

pub async fn create_equipment(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<ItemDto>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let item = stock_service::create_item(&db, payload)
        .await
        .map_err(error_response)?;

    tracing::info!(name = %item.name, total = item.total, "equipment created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Equipment created successfully", "item": item })),
    ))
}

#[derive(Deserialize)]
pub struct UpdateItemPayload {
    pub name: Option<String>,
    pub stock: Option<i32>,
    pub total: Option<i32>,
}

pub async fn update_equipment(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let item = stock_service::update_item(&db, id, payload.name, payload.stock, payload.total)
        .await
        .map_err(error_response)?;

    Ok(Json(
        json!({ "message": "Equipment updated successfully", "item": item }),
    ))
}

pub async fn delete_equipment(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    stock_service::delete_item(&db, id)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({ "message": "Equipment deleted successfully" })))
}
