//! Alert models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of alert; together with the item code it identifies one alert row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "VARCHAR"))]
pub enum AlertType {
    #[serde(rename = "Low Stock Alert")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Low Stock Alert"))]
    LowStock,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::LowStock => "Low Stock Alert",
        }
    }
}

/// A stored alert
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Alert {
    pub id: i64,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub item_code: String,
    pub message: String,
    pub date: DateTime<Utc>,
    pub is_read: bool,
    pub settled: bool,
    pub settled_time: Option<DateTime<Utc>>,
}

/// Display text for a low-stock alert
pub fn low_stock_message(item_code: &str, remaining: i64) -> String {
    format!(
        "Stock for item {} is low: {} unit(s) remaining",
        item_code, remaining
    )
}
