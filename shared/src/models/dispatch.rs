//! Dispatch models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::inventory::StockBalance;

/// Status of a dispatch record; dispatches are created already dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "VARCHAR"))]
pub enum DispatchStatus {
    Dispatched,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchStatus::Dispatched => "Dispatched",
        }
    }
}

/// Stock leaving the warehouse toward a driver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Dispatch {
    pub id: i64,
    pub manager_id: i64,
    /// Absent for ad hoc dispatches not tied to a stock request
    pub request_id: Option<i64>,
    pub driver_id: i64,
    pub dispatch_date: DateTime<Utc>,
    /// Item code of the dispatched stock
    pub items_dispatched: String,
    pub dispatched_qty: i64,
    pub status: DispatchStatus,
}

/// A committed dispatch and the item's stock after deduction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub dispatch: Dispatch,
    pub updated_inventory: StockBalance,
}
