//! Inventory ledger models and stock deduction planning
//!
//! Stock is an append-only ledger of entries. The on-hand quantity of an item
//! is the sum of its entries; dispatches draw entries down, newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Aggregate quantity below which an item is considered low on stock
pub const LOW_STOCK_THRESHOLD: i64 = 3;

/// A single ledger entry (one received batch of an item)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryRow {
    pub id: i64,
    pub item_code: String,
    pub item_name: String,
    pub quantity: i64,
    pub description: Option<String>,
    pub entry_time: DateTime<Utc>,
}

/// Aggregated stock for an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLevel {
    pub item_code: String,
    pub item_name: String,
    pub quantity: i64,
    pub description: Option<String>,
}

/// Remaining stock for an item after a movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockBalance {
    pub item_code: String,
    pub quantity: i64,
}

/// The part of a ledger entry needed to plan a deduction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockBatch {
    pub id: i64,
    pub quantity: i64,
}

/// Quantity taken from one ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Deduction {
    pub row_id: i64,
    pub taken: i64,
    pub left_in_row: i64,
}

/// Row-by-row plan for removing a quantity from stock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeductionPlan {
    pub deductions: Vec<Deduction>,
    pub previous_total: i64,
    pub remaining_total: i64,
}

/// Sum of quantities across batches; fails instead of overflowing
pub fn aggregate_quantity(batches: &[StockBatch]) -> Result<i64, DomainError> {
    batches
        .iter()
        .try_fold(0i64, |total, b| total.checked_add(b.quantity))
        .ok_or_else(|| DomainError::validation("quantity", "stock total is out of range"))
}

/// Plan the removal of `requested` units from `batches`.
///
/// Batches must already be ordered newest entry first; they are drawn down in
/// that order. Each row gives at most its own quantity, so no row goes
/// negative. Fails with `InsufficientStock` when the aggregate is smaller than
/// the request; taking exactly the aggregate drains the item to zero.
pub fn plan_deduction(
    item_code: &str,
    batches: &[StockBatch],
    requested: i64,
) -> Result<DeductionPlan, DomainError> {
    if requested <= 0 {
        return Err(DomainError::validation("dispatched_qty", "must be greater than zero"));
    }

    let previous_total = aggregate_quantity(batches)?;
    if previous_total < requested {
        return Err(DomainError::InsufficientStock {
            item_code: item_code.to_string(),
            requested,
            available: previous_total,
        });
    }

    let mut outstanding = requested;
    let mut deductions = Vec::new();
    for batch in batches.iter().filter(|b| b.quantity > 0) {
        if outstanding == 0 {
            break;
        }
        let taken = batch.quantity.min(outstanding);
        outstanding -= taken;
        deductions.push(Deduction {
            row_id: batch.id,
            taken,
            left_in_row: batch.quantity - taken,
        });
    }

    Ok(DeductionPlan {
        deductions,
        previous_total,
        remaining_total: previous_total - requested,
    })
}

/// What a stock level implies for the item's low-stock alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAlertAction {
    /// Raise or refresh the alert with the remaining quantity
    Raise { remaining: i64 },
    /// Settle any open alert
    Settle,
}

/// Decide the alert action for an item's aggregate quantity
pub fn stock_alert_action(total: i64, threshold: i64) -> StockAlertAction {
    if total < threshold {
        StockAlertAction::Raise { remaining: total }
    } else {
        StockAlertAction::Settle
    }
}

/// Whether an aggregate is below the low-stock threshold
pub fn is_low_stock(total: i64, threshold: i64) -> bool {
    total < threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batches(quantities: &[i64]) -> Vec<StockBatch> {
        quantities
            .iter()
            .enumerate()
            .map(|(i, &quantity)| StockBatch {
                id: i as i64 + 1,
                quantity,
            })
            .collect()
    }

    #[test]
    fn test_deduction_draws_first_rows_first() {
        let plan = plan_deduction("X1", &batches(&[4, 6]), 5).unwrap();
        assert_eq!(
            plan.deductions,
            vec![
                Deduction { row_id: 1, taken: 4, left_in_row: 0 },
                Deduction { row_id: 2, taken: 1, left_in_row: 5 },
            ]
        );
        assert_eq!(plan.previous_total, 10);
        assert_eq!(plan.remaining_total, 5);
    }

    #[test]
    fn test_deduction_stops_when_satisfied() {
        let plan = plan_deduction("X1", &batches(&[10, 6, 3]), 2).unwrap();
        assert_eq!(plan.deductions.len(), 1);
        assert_eq!(plan.deductions[0].left_in_row, 8);
    }

    #[test]
    fn test_exact_aggregate_drains_to_zero() {
        let plan = plan_deduction("X1", &batches(&[2, 3]), 5).unwrap();
        assert_eq!(plan.remaining_total, 0);
        assert!(plan.deductions.iter().all(|d| d.left_in_row == 0));
    }

    #[test]
    fn test_insufficient_stock() {
        let err = plan_deduction("X1", &batches(&[2, 1]), 4).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                item_code: "X1".to_string(),
                requested: 4,
                available: 3,
            }
        );
    }

    #[test]
    fn test_empty_rows_are_skipped() {
        let plan = plan_deduction("X1", &batches(&[0, 3]), 1).unwrap();
        assert_eq!(plan.deductions, vec![Deduction { row_id: 2, taken: 1, left_in_row: 2 }]);
    }

    #[test]
    fn test_non_positive_request_rejected() {
        assert!(matches!(
            plan_deduction("X1", &batches(&[5]), 0),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn test_overflowing_total_is_an_error() {
        let huge = batches(&[i64::MAX, 1]);
        assert!(matches!(
            aggregate_quantity(&huge),
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            plan_deduction("X1", &huge, 1),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn test_stock_alert_action() {
        assert_eq!(stock_alert_action(0, 3), StockAlertAction::Raise { remaining: 0 });
        assert_eq!(stock_alert_action(2, 3), StockAlertAction::Raise { remaining: 2 });
        assert_eq!(stock_alert_action(3, 3), StockAlertAction::Settle);
        assert!(is_low_stock(2, LOW_STOCK_THRESHOLD));
        assert!(!is_low_stock(3, LOW_STOCK_THRESHOLD));
    }
}
