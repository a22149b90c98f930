//! Inventory ledger service: stock entries, aggregates and low-stock views

use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{
    optional_text, parse_timestamp, require_text, InventoryRow, QuantityInput, StockLevel,
};
use sqlx::{PgConnection, PgPool};

use crate::error::{AppError, AppResult};
use crate::services::AlertService;

const ROW_COLUMNS: &str = "id, item_code, item_name, quantity, description, entry_time";

/// Longest stored item name
const MAX_ITEM_NAME_LENGTH: usize = 100;

/// Longest stored entry description
const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Inventory service for recording stock entries and reading stock levels
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
    low_stock_threshold: i64,
}

/// Input for recording a stock entry
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEntryInput {
    pub item_code: Option<String>,
    pub item_name: Option<String>,
    pub quantity: Option<QuantityInput>,
    pub description: Option<String>,
    pub stock_entry_time: Option<String>,
}

/// One item's aggregate with its ledger entries
#[derive(Debug, Clone, Serialize)]
pub struct ItemStock {
    pub item_code: String,
    pub quantity: i64,
    pub entries: Vec<InventoryRow>,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool, low_stock_threshold: i64) -> Self {
        Self {
            db,
            low_stock_threshold,
        }
    }

    /// Record a stock entry and settle the item's low-stock alert if stock recovered
    pub async fn add_entry(&self, input: AddEntryInput) -> AppResult<InventoryRow> {
        let item_code = require_text("itemCode", input.item_code.as_deref())?;
        let item_name = input
            .item_name
            .as_deref()
            .and_then(|name| optional_text(Some(name), MAX_ITEM_NAME_LENGTH))
            .ok_or_else(|| AppError::validation("itemName", "is required"))?;
        let quantity = input
            .quantity
            .as_ref()
            .ok_or_else(|| AppError::validation("quantity", "is required"))?
            .parse_positive("quantity")?;
        let description = optional_text(input.description.as_deref(), MAX_DESCRIPTION_LENGTH)
            .ok_or_else(|| AppError::validation("description", "is required"))?;
        let entry_time = match input.stock_entry_time.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => parse_timestamp("stockEntryTime", value)?,
            _ => Utc::now(),
        };

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            r#"
            INSERT INTO inventory (item_code, item_name, quantity, description, entry_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ROW_COLUMNS
        ))
        .bind(&item_code)
        .bind(&item_name)
        .bind(quantity)
        .bind(&description)
        .bind(entry_time)
        .fetch_one(&mut *tx)
        .await?;

        let total = aggregate_on(&mut tx, &item_code).await?;
        if total >= self.low_stock_threshold {
            AlertService::settle_low_stock(&mut tx, &item_code).await?;
        }

        tx.commit().await?;

        tracing::info!(item_code = %row.item_code, quantity, total, "Stock entry recorded");
        Ok(row)
    }

    /// Aggregate quantity for an item (0 when it has no entries)
    pub async fn aggregate(&self, item_code: &str) -> AppResult<i64> {
        let mut conn = self.db.acquire().await?;
        aggregate_on(&mut conn, item_code).await
    }

    /// Aggregated stock grouped by item code, name and description
    pub async fn list_aggregated(&self) -> AppResult<Vec<StockLevel>> {
        let levels = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT item_code, item_name, SUM(quantity)::BIGINT AS quantity, description
            FROM inventory
            GROUP BY item_code, item_name, description
            ORDER BY item_code, item_name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(levels)
    }

    /// Items whose aggregate is below `threshold` (defaults to the configured one)
    pub async fn list_low(&self, threshold: Option<i64>) -> AppResult<Vec<StockLevel>> {
        let threshold = threshold.unwrap_or(self.low_stock_threshold);
        let levels = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT item_code,
                   MAX(item_name) AS item_name,
                   SUM(quantity)::BIGINT AS quantity,
                   MAX(description) AS description
            FROM inventory
            GROUP BY item_code
            HAVING SUM(quantity) < $1
            ORDER BY SUM(quantity) ASC, item_code
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.db)
        .await?;

        Ok(levels)
    }

    /// Raw ledger rows whose own quantity is below `threshold`
    pub async fn list_low_rows(&self, threshold: Option<i64>) -> AppResult<Vec<InventoryRow>> {
        let threshold = threshold.unwrap_or(self.low_stock_threshold);
        let rows = sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {} FROM inventory WHERE quantity < $1 ORDER BY item_code, entry_time DESC",
            ROW_COLUMNS
        ))
        .bind(threshold)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// An item's aggregate and its ledger entries, newest first
    pub async fn get_item(&self, item_code: &str) -> AppResult<ItemStock> {
        let entries = sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {} FROM inventory WHERE item_code = $1 ORDER BY entry_time DESC, id DESC",
            ROW_COLUMNS
        ))
        .bind(item_code)
        .fetch_all(&self.db)
        .await?;

        if entries.is_empty() {
            return Err(AppError::NotFound(format!("Inventory item {}", item_code)));
        }

        Ok(ItemStock {
            item_code: item_code.to_string(),
            quantity: entries.iter().map(|e| e.quantity).sum(),
            entries,
        })
    }
}

/// Aggregate quantity for an item on an open connection or transaction
pub(crate) async fn aggregate_on(conn: &mut PgConnection, item_code: &str) -> AppResult<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM inventory WHERE item_code = $1",
    )
    .bind(item_code)
    .fetch_one(&mut *conn)
    .await?;

    Ok(total)
}
