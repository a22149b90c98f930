//! Alert registry: one deduplicated low-stock alert per item
//!
//! Alerts are keyed on (alert_type, item_code). Raising an alert that already
//! exists refreshes it instead of inserting a duplicate; settling marks it
//! resolved once stock recovers.

use shared::{low_stock_message, stock_alert_action, Alert, AlertType, StockAlertAction};
use sqlx::{PgConnection, PgPool};

use crate::error::{AppError, AppResult};

const ALERT_COLUMNS: &str =
    "id, alert_type, item_code, message, date, is_read, settled, settled_time";

/// Alert service for listing and acknowledging alerts
#[derive(Clone)]
pub struct AlertService {
    db: PgPool,
}

impl AlertService {
    /// Create a new AlertService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All alerts, newest first
    pub async fn list(&self) -> AppResult<Vec<Alert>> {
        let alerts = sqlx::query_as::<_, Alert>(&format!(
            "SELECT {} FROM alerts ORDER BY date DESC, id DESC",
            ALERT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(alerts)
    }

    /// Alerts whose condition has not recovered yet
    pub async fn list_unsettled(&self) -> AppResult<Vec<Alert>> {
        let alerts = sqlx::query_as::<_, Alert>(&format!(
            "SELECT {} FROM alerts WHERE settled = FALSE ORDER BY date DESC, id DESC",
            ALERT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(alerts)
    }

    /// Mark an alert as read
    pub async fn mark_read(&self, alert_id: i64) -> AppResult<Alert> {
        sqlx::query_as::<_, Alert>(&format!(
            "UPDATE alerts SET is_read = TRUE WHERE id = $1 RETURNING {}",
            ALERT_COLUMNS
        ))
        .bind(alert_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Alert".to_string()))
    }

    /// Raise or settle the low-stock alert for an item given its new aggregate
    pub async fn record_stock_level(
        conn: &mut PgConnection,
        item_code: &str,
        total: i64,
        threshold: i64,
    ) -> AppResult<()> {
        match stock_alert_action(total, threshold) {
            StockAlertAction::Raise { remaining } => {
                Self::upsert_low_stock(conn, item_code, remaining).await?;
            }
            StockAlertAction::Settle => {
                Self::settle_low_stock(conn, item_code).await?;
            }
        }
        Ok(())
    }

    /// Insert the item's low-stock alert, or refresh it and reopen it if present
    pub async fn upsert_low_stock(
        conn: &mut PgConnection,
        item_code: &str,
        remaining: i64,
    ) -> AppResult<Alert> {
        let alert = sqlx::query_as::<_, Alert>(&format!(
            r#"
            INSERT INTO alerts (alert_type, item_code, message, date, is_read, settled, settled_time)
            VALUES ($1, $2, $3, NOW(), FALSE, FALSE, NULL)
            ON CONFLICT (alert_type, item_code) DO UPDATE
            SET message = EXCLUDED.message,
                date = NOW(),
                is_read = FALSE,
                settled = FALSE,
                settled_time = NULL
            RETURNING {}
            "#,
            ALERT_COLUMNS
        ))
        .bind(AlertType::LowStock)
        .bind(item_code)
        .bind(low_stock_message(item_code, remaining))
        .fetch_one(&mut *conn)
        .await?;

        tracing::info!(item_code, remaining, "Low stock alert raised");
        Ok(alert)
    }

    /// Settle the item's open low-stock alert; returns whether one was open
    pub async fn settle_low_stock(conn: &mut PgConnection, item_code: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE alerts
            SET settled = TRUE, settled_time = NOW()
            WHERE alert_type = $1 AND item_code = $2 AND settled = FALSE
            "#,
        )
        .bind(AlertType::LowStock)
        .bind(item_code)
        .execute(&mut *conn)
        .await?;

        let settled = result.rows_affected() > 0;
        if settled {
            tracing::info!(item_code, "Low stock alert settled");
        }
        Ok(settled)
    }
}
