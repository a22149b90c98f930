//! HTTP handlers for delivery confirmations

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{DeliveryConfirmation, Permission};

use crate::error::AppResult;
use crate::extract::JsonBody;
use crate::middleware::CurrentUser;
use crate::services::delivery::ConfirmInput;
use crate::services::DeliveryService;
use crate::AppState;

/// Confirm a delivery; 201 when the first confirmation is stored, 200 after
pub async fn confirm_delivery(
    State(state): State<AppState>,
    current_user: CurrentUser,
    JsonBody(input): JsonBody<ConfirmInput>,
) -> AppResult<(StatusCode, Json<DeliveryConfirmation>)> {
    current_user
        .0
        .require(&state.permissions, Permission::ConfirmDelivery)?;
    let (confirmation, created) = DeliveryService::new(state.db).confirm(input).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(confirmation)))
}

/// Confirmation state for a dispatch
pub async fn get_delivery(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(dispatch_id): Path<i64>,
) -> AppResult<Json<DeliveryConfirmation>> {
    current_user
        .0
        .require(&state.permissions, Permission::ViewInventory)?;
    let confirmation = DeliveryService::new(state.db).get(dispatch_id).await?;
    Ok(Json(confirmation))
}
