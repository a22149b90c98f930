//! Stock request queue: submission and approval decisions

use serde::Deserialize;
use shared::{require_text, require_timestamp, RequestStatus, StockRequest, StockRequestForm};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::inventory::aggregate_on;
use crate::services::AlertService;

const REQUEST_COLUMNS: &str = r#"
    id, site_worker, request_date, delivery_location, urgency, item_code, item_name,
    quantity, requestor_email, job_id, status, approval_status, decision_by,
    decision_time, created_at
"#;

/// Stock request service
#[derive(Clone)]
pub struct StockRequestService {
    db: PgPool,
    policy: SubmissionPolicy,
}

/// Side effects applied when a request is submitted
#[derive(Debug, Clone, Copy)]
pub struct SubmissionPolicy {
    pub low_stock_threshold: i64,
    /// Settle the item's low-stock alert if stock is already sufficient
    pub settle_alert_on_submit: bool,
}

/// Input for approving or rejecting a request
/// `decision_by` is trimmed and capped at 50 characters when stored
#[derive(Debug, Default, Deserialize)]
pub struct DecisionInput {
    pub decision_by: Option<String>,
    pub decision_time: Option<String>,
}

/// Filter for listing requests
#[derive(Debug, Default, Deserialize)]
pub struct RequestFilter {
    pub status: Option<String>,
}

impl StockRequestService {
    /// Create a new StockRequestService instance
    pub fn new(db: PgPool, policy: SubmissionPolicy) -> Self {
        Self { db, policy }
    }

    /// Store a new request as Pending
    pub async fn submit(&self, form: StockRequestForm) -> AppResult<StockRequest> {
        let request = form.normalize()?;

        let mut tx = self.db.begin().await?;

        let created = sqlx::query_as::<_, StockRequest>(&format!(
            r#"
            INSERT INTO stock_requests (
                site_worker, request_date, delivery_location, urgency, item_code, item_name,
                quantity, requestor_email, job_id, status, approval_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(&request.site_worker)
        .bind(request.request_date)
        .bind(&request.delivery_location)
        .bind(&request.urgency)
        .bind(&request.item_code)
        .bind(&request.item_name)
        .bind(request.quantity)
        .bind(&request.requestor_email)
        .bind(&request.job_id)
        .bind(RequestStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        // Stock may already cover the item again; clear its alert if so.
        // Runs regardless of whether this request is ever approved.
        if self.policy.settle_alert_on_submit {
            let total = aggregate_on(&mut tx, &created.item_code).await?;
            if total >= self.policy.low_stock_threshold {
                AlertService::settle_low_stock(&mut tx, &created.item_code).await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            request_id = created.id,
            item_code = %created.item_code,
            quantity = created.quantity,
            "Stock request submitted"
        );
        Ok(created)
    }

    /// Approve or reject a Pending request
    pub async fn decide(
        &self,
        request_id: i64,
        decision: RequestStatus,
        input: DecisionInput,
    ) -> AppResult<StockRequest> {
        let decision_by = require_text("decision_by", input.decision_by.as_deref())?;
        let decision_time = require_timestamp("decision_time", input.decision_time.as_deref())?;

        let mut tx = self.db.begin().await?;

        let current = sqlx::query_scalar::<_, RequestStatus>(
            "SELECT approval_status FROM stock_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock request".to_string()))?;

        let next = current.decide(decision)?;

        let updated = sqlx::query_as::<_, StockRequest>(&format!(
            r#"
            UPDATE stock_requests
            SET status = $1, approval_status = $1, decision_by = $2, decision_time = $3
            WHERE id = $4
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(next)
        .bind(&decision_by)
        .bind(decision_time)
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(request_id, decision = %next, decision_by = %decision_by, "Stock request decided");
        Ok(updated)
    }

    /// Get a request by id
    pub async fn get(&self, request_id: i64) -> AppResult<StockRequest> {
        sqlx::query_as::<_, StockRequest>(&format!(
            "SELECT {} FROM stock_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock request".to_string()))
    }

    /// List requests, newest first, optionally filtered by approval status
    pub async fn list(&self, filter: RequestFilter) -> AppResult<Vec<StockRequest>> {
        let status = match filter.status.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Some(
                RequestStatus::from_str(s)
                    .ok_or_else(|| AppError::validation("status", "unknown status"))?,
            ),
            _ => None,
        };

        let requests = sqlx::query_as::<_, StockRequest>(&format!(
            r#"
            SELECT {}
            FROM stock_requests
            WHERE ($1::VARCHAR IS NULL OR approval_status = $1)
            ORDER BY created_at DESC, id DESC
            "#,
            REQUEST_COLUMNS
        ))
        .bind(status)
        .fetch_all(&self.db)
        .await?;

        Ok(requests)
    }
}
