//! Delivery confirmation tracker

use serde::Deserialize;
use shared::{require_text, require_timestamp, ConfirmationRole, DeliveryConfirmation};
use sqlx::{PgConnection, PgPool};

use crate::error::{AppError, AppResult};

const CONFIRMATION_COLUMNS: &str =
    "dispatch_id, driver_confirmation, site_worker_confirmation, delivery_status";

/// Delivery confirmation service
#[derive(Clone)]
pub struct DeliveryService {
    db: PgPool,
}

/// Input for confirming a delivery
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmInput {
    /// Dispatch being confirmed
    pub id: Option<i64>,
    pub role: Option<String>,
    pub confirmation_time: Option<String>,
}

impl DeliveryService {
    /// Create a new DeliveryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a driver or site worker confirmation.
    ///
    /// Returns the stored state and whether this call created it.
    pub async fn confirm(&self, input: ConfirmInput) -> AppResult<(DeliveryConfirmation, bool)> {
        let dispatch_id = input
            .id
            .ok_or_else(|| AppError::validation("id", "is required"))?;
        let role = ConfirmationRole::parse(&require_text("role", input.role.as_deref())?)?;
        let at = require_timestamp("confirmationTime", input.confirmation_time.as_deref())?;

        let mut tx = self.db.begin().await?;

        lock_dispatch(&mut tx, dispatch_id).await?;

        let existing = sqlx::query_as::<_, DeliveryConfirmation>(&format!(
            "SELECT {} FROM delivery_confirmations WHERE dispatch_id = $1",
            CONFIRMATION_COLUMNS
        ))
        .bind(dispatch_id)
        .fetch_optional(&mut *tx)
        .await?;

        let next = DeliveryConfirmation::apply(existing.as_ref(), dispatch_id, role, at);

        let stored = sqlx::query_as::<_, DeliveryConfirmation>(&format!(
            r#"
            INSERT INTO delivery_confirmations (
                dispatch_id, driver_confirmation, site_worker_confirmation, delivery_status
            )
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (dispatch_id) DO UPDATE
            SET driver_confirmation = EXCLUDED.driver_confirmation,
                site_worker_confirmation = EXCLUDED.site_worker_confirmation,
                delivery_status = EXCLUDED.delivery_status
            RETURNING {}
            "#,
            CONFIRMATION_COLUMNS
        ))
        .bind(next.dispatch_id)
        .bind(next.driver_confirmation)
        .bind(next.site_worker_confirmation)
        .bind(next.delivery_status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            dispatch_id,
            role = role.as_str(),
            status = stored.delivery_status.as_str(),
            "Delivery confirmed"
        );
        Ok((stored, existing.is_none()))
    }

    /// Confirmation state of a dispatch
    pub async fn get(&self, dispatch_id: i64) -> AppResult<DeliveryConfirmation> {
        sqlx::query_as::<_, DeliveryConfirmation>(&format!(
            "SELECT {} FROM delivery_confirmations WHERE dispatch_id = $1",
            CONFIRMATION_COLUMNS
        ))
        .bind(dispatch_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Delivery confirmation".to_string()))
    }
}

async fn lock_dispatch(conn: &mut PgConnection, dispatch_id: i64) -> AppResult<()> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM dispatches WHERE id = $1 FOR UPDATE")
        .bind(dispatch_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Dispatch".to_string()))?;
    Ok(())
}
