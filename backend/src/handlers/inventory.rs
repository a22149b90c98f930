//! HTTP handlers for the inventory ledger

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use shared::{InventoryRow, Permission, StockLevel};

use crate::error::AppResult;
use crate::extract::JsonBody;
use crate::middleware::CurrentUser;
use crate::services::inventory::{AddEntryInput, ItemStock};
use crate::services::InventoryService;
use crate::AppState;

/// Query parameters for the low-stock view
#[derive(Debug, Default, Deserialize)]
pub struct LowStockQuery {
    /// `items` returns per-item aggregates instead of raw ledger rows
    pub view: Option<String>,
    pub threshold: Option<i64>,
}

fn service(state: &AppState) -> InventoryService {
    InventoryService::new(state.db.clone(), state.config.inventory.low_stock_threshold)
}

/// Record a stock entry
pub async fn add_entry(
    State(state): State<AppState>,
    current_user: CurrentUser,
    JsonBody(input): JsonBody<AddEntryInput>,
) -> AppResult<(StatusCode, Json<InventoryRow>)> {
    current_user
        .0
        .require(&state.permissions, Permission::ManageInventory)?;
    let row = service(&state).add_entry(input).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// Aggregated stock levels
pub async fn list_inventory(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<StockLevel>>> {
    current_user
        .0
        .require(&state.permissions, Permission::ViewInventory)?;
    let levels = service(&state).list_aggregated().await?;
    Ok(Json(levels))
}

/// Items below the low-stock threshold
pub async fn list_low_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Response> {
    current_user
        .0
        .require(&state.permissions, Permission::ViewInventory)?;
    let service = service(&state);
    let response = match query.view.as_deref() {
        Some("items") => Json(service.list_low(query.threshold).await?).into_response(),
        _ => Json(service.list_low_rows(query.threshold).await?).into_response(),
    };
    Ok(response)
}

/// One item's aggregate and entries
pub async fn get_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_code): Path<String>,
) -> AppResult<Json<ItemStock>> {
    current_user
        .0
        .require(&state.permissions, Permission::ViewInventory)?;
    let item = service(&state).get_item(&item_code).await?;
    Ok(Json(item))
}
