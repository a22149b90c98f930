//! HTTP handlers for stock requests

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{Permission, RequestStatus, StockRequest, StockRequestForm};

use crate::error::AppResult;
use crate::extract::JsonBody;
use crate::middleware::CurrentUser;
use crate::services::stock_request::{DecisionInput, RequestFilter};
use crate::services::{StockRequestService, SubmissionPolicy};
use crate::AppState;

fn service(state: &AppState) -> StockRequestService {
    StockRequestService::new(
        state.db.clone(),
        SubmissionPolicy {
            low_stock_threshold: state.config.inventory.low_stock_threshold,
            settle_alert_on_submit: state.config.alerts.settle_on_request_submission,
        },
    )
}

/// Submit a stock request
pub async fn submit_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    JsonBody(form): JsonBody<StockRequestForm>,
) -> AppResult<(StatusCode, Json<StockRequest>)> {
    current_user
        .0
        .require(&state.permissions, Permission::RequestStock)?;
    let request = service(&state).submit(form).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// List stock requests
pub async fn list_requests(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<RequestFilter>,
) -> AppResult<Json<Vec<StockRequest>>> {
    current_user
        .0
        .require(&state.permissions, Permission::ViewInventory)?;
    let requests = service(&state).list(filter).await?;
    Ok(Json(requests))
}

/// Get a stock request by id
pub async fn get_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<i64>,
) -> AppResult<Json<StockRequest>> {
    current_user
        .0
        .require(&state.permissions, Permission::ViewInventory)?;
    let request = service(&state).get(request_id).await?;
    Ok(Json(request))
}

/// Approve a pending request
pub async fn approve_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<i64>,
    JsonBody(input): JsonBody<DecisionInput>,
) -> AppResult<Json<StockRequest>> {
    current_user
        .0
        .require(&state.permissions, Permission::ApproveRequests)?;
    let request = service(&state)
        .decide(request_id, RequestStatus::Approved, input)
        .await?;
    Ok(Json(request))
}

/// Reject a pending request
pub async fn reject_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<i64>,
    JsonBody(input): JsonBody<DecisionInput>,
) -> AppResult<Json<StockRequest>> {
    current_user
        .0
        .require(&state.permissions, Permission::ApproveRequests)?;
    let request = service(&state)
        .decide(request_id, RequestStatus::Rejected, input)
        .await?;
    Ok(Json(request))
}
