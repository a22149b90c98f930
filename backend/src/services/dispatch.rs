//! Dispatch processor
//!
//! A dispatch draws an item's ledger entries down newest first and records
//! the movement. The whole sequence runs in one transaction holding row locks
//! on the item's entries, so concurrent dispatches of the same item queue up
//! behind each other and a failed dispatch leaves nothing behind.

use serde::Deserialize;
use shared::{
    plan_deduction, require_text, require_timestamp, Dispatch, DispatchOutcome, DispatchStatus,
    StockBalance, StockBatch,
};
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::AlertService;

const DISPATCH_COLUMNS: &str = r#"
    id, manager_id, request_id, driver_id, dispatch_date, items_dispatched,
    dispatched_qty, status
"#;

/// Dispatch service
#[derive(Clone)]
pub struct DispatchService {
    db: PgPool,
    low_stock_threshold: i64,
}

/// Input for dispatching stock to a driver
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DispatchInput {
    #[validate(range(min = 1, message = "must be a valid user id"))]
    pub manager_id: i64,
    pub request_id: Option<i64>,
    #[validate(range(min = 1, message = "must be a valid user id"))]
    pub driver_id: i64,
    pub dispatch_date: Option<String>,
    /// Item code to dispatch
    pub items_dispatched: Option<String>,
    #[validate(range(min = 1, max = 1000000000, message = "must be between 1 and 1000000000"))]
    pub dispatched_qty: i64,
}

impl DispatchService {
    /// Create a new DispatchService instance
    pub fn new(db: PgPool, low_stock_threshold: i64) -> Self {
        Self {
            db,
            low_stock_threshold,
        }
    }

    /// Dispatch stock: lock, check, record, deduct, update the alert, commit
    pub async fn dispatch(&self, input: DispatchInput) -> AppResult<DispatchOutcome> {
        input.validate()?;
        let item_code = require_text("itemsDispatched", input.items_dispatched.as_deref())?;
        let dispatch_date = require_timestamp("dispatchDate", input.dispatch_date.as_deref())?;

        let mut tx = self.db.begin().await?;

        if let Some(request_id) = input.request_id {
            ensure_request_exists(&mut tx, request_id).await?;
        }

        let batches = sqlx::query_as::<_, StockBatch>(
            r#"
            SELECT id, quantity
            FROM inventory
            WHERE item_code = $1 AND quantity > 0
            ORDER BY entry_time DESC, id DESC
            FOR UPDATE
            "#,
        )
        .bind(&item_code)
        .fetch_all(&mut *tx)
        .await?;

        // Dropping `tx` on the error path rolls the transaction back
        let plan = plan_deduction(&item_code, &batches, input.dispatched_qty).map_err(|e| {
            tracing::debug!(item_code = %item_code, requested = input.dispatched_qty, "Dispatch rejected: {}", e);
            AppError::from(e)
        })?;

        let dispatch = sqlx::query_as::<_, Dispatch>(&format!(
            r#"
            INSERT INTO dispatches (
                manager_id, request_id, driver_id, dispatch_date, items_dispatched,
                dispatched_qty, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            DISPATCH_COLUMNS
        ))
        .bind(input.manager_id)
        .bind(input.request_id)
        .bind(input.driver_id)
        .bind(dispatch_date)
        .bind(&item_code)
        .bind(input.dispatched_qty)
        .bind(DispatchStatus::Dispatched)
        .fetch_one(&mut *tx)
        .await?;

        for deduction in &plan.deductions {
            sqlx::query("UPDATE inventory SET quantity = quantity - $1 WHERE id = $2")
                .bind(deduction.taken)
                .bind(deduction.row_id)
                .execute(&mut *tx)
                .await?;
        }

        AlertService::record_stock_level(
            &mut tx,
            &item_code,
            plan.remaining_total,
            self.low_stock_threshold,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            dispatch_id = dispatch.id,
            item_code = %item_code,
            quantity = input.dispatched_qty,
            rows = plan.deductions.len(),
            remaining = plan.remaining_total,
            "Stock dispatched"
        );

        Ok(DispatchOutcome {
            dispatch,
            updated_inventory: StockBalance {
                item_code,
                quantity: plan.remaining_total,
            },
        })
    }

    /// Get a dispatch by id
    pub async fn get(&self, dispatch_id: i64) -> AppResult<Dispatch> {
        sqlx::query_as::<_, Dispatch>(&format!(
            "SELECT {} FROM dispatches WHERE id = $1",
            DISPATCH_COLUMNS
        ))
        .bind(dispatch_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Dispatch".to_string()))
    }

    /// All dispatches, most recent dispatch date first
    pub async fn list(&self) -> AppResult<Vec<Dispatch>> {
        let dispatches = sqlx::query_as::<_, Dispatch>(&format!(
            "SELECT {} FROM dispatches ORDER BY dispatch_date DESC, id DESC",
            DISPATCH_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(dispatches)
    }
}

async fn ensure_request_exists(conn: &mut PgConnection, request_id: i64) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM stock_requests WHERE id = $1)",
    )
    .bind(request_id)
    .fetch_one(&mut *conn)
    .await?;

    if !exists {
        return Err(AppError::NotFound("Stock request".to_string()));
    }
    Ok(())
}
