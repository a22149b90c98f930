//! HTTP handlers for dispatches

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{Dispatch, DispatchOutcome, Permission};

use crate::error::AppResult;
use crate::extract::JsonBody;
use crate::middleware::CurrentUser;
use crate::services::dispatch::DispatchInput;
use crate::services::DispatchService;
use crate::AppState;

fn service(state: &AppState) -> DispatchService {
    DispatchService::new(state.db.clone(), state.config.inventory.low_stock_threshold)
}

/// Dispatch stock to a driver
pub async fn create_dispatch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    JsonBody(input): JsonBody<DispatchInput>,
) -> AppResult<(StatusCode, Json<DispatchOutcome>)> {
    current_user
        .0
        .require(&state.permissions, Permission::DispatchStock)?;
    let outcome = service(&state).dispatch(input).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// List dispatches
pub async fn list_dispatches(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Dispatch>>> {
    current_user
        .0
        .require(&state.permissions, Permission::ViewInventory)?;
    let dispatches = service(&state).list().await?;
    Ok(Json(dispatches))
}

/// Get a dispatch by id
pub async fn get_dispatch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(dispatch_id): Path<i64>,
) -> AppResult<Json<Dispatch>> {
    current_user
        .0
        .require(&state.permissions, Permission::ViewInventory)?;
    let dispatch = service(&state).get(dispatch_id).await?;
    Ok(Json(dispatch))
}
