//! HTTP handlers for alerts

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::{Alert, Permission};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::AlertService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AlertQuery {
    /// Only alerts that have not been settled
    #[serde(default)]
    pub unsettled: bool,
}

/// List alerts, newest first
pub async fn list_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<AlertQuery>,
) -> AppResult<Json<Vec<Alert>>> {
    current_user
        .0
        .require(&state.permissions, Permission::ViewAlerts)?;
    let service = AlertService::new(state.db);
    let alerts = if query.unsettled {
        service.list_unsettled().await?
    } else {
        service.list().await?
    };
    Ok(Json(alerts))
}

/// Mark an alert as read
pub async fn mark_alert_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(alert_id): Path<i64>,
) -> AppResult<Json<Alert>> {
    current_user
        .0
        .require(&state.permissions, Permission::ManageAlerts)?;
    let alert = AlertService::new(state.db).mark_read(alert_id).await?;
    Ok(Json(alert))
}
