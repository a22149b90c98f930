//! Stock request models and approval lifecycle

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::validation::{
    optional_text, parse_date, require_text, QuantityInput, MAX_FIELD_LENGTH,
};

/// Urgency stored when the form leaves it blank
pub const DEFAULT_URGENCY: &str = "Normal";

/// Approval state of a stock request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "VARCHAR"))]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(RequestStatus::Pending),
            "Approved" => Some(RequestStatus::Approved),
            "Rejected" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }

    /// Approved and Rejected are terminal
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// Apply an approval decision to a request in this state
    pub fn decide(self, decision: RequestStatus) -> Result<RequestStatus, DomainError> {
        match (self, decision) {
            (RequestStatus::Pending, RequestStatus::Approved | RequestStatus::Rejected) => {
                Ok(decision)
            }
            (from, to) => Err(DomainError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored stock request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockRequest {
    pub id: i64,
    pub site_worker: String,
    pub request_date: NaiveDate,
    pub delivery_location: String,
    pub urgency: String,
    pub item_code: String,
    pub item_name: String,
    pub quantity: i64,
    pub requestor_email: String,
    pub job_id: String,
    pub status: RequestStatus,
    pub approval_status: RequestStatus,
    pub decision_by: Option<String>,
    pub decision_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Stock request form as submitted by a site worker
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockRequestForm {
    pub site_worker: Option<String>,
    pub request_date: Option<String>,
    pub delivery_location: Option<String>,
    pub urgency: Option<String>,
    pub item_code: Option<String>,
    pub item_name: Option<String>,
    pub quantity: Option<QuantityInput>,
    pub requestor_email: Option<String>,
    pub job_id: Option<String>,
}

/// A validated, normalized stock request ready to store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStockRequest {
    pub site_worker: String,
    pub request_date: NaiveDate,
    pub delivery_location: String,
    pub urgency: String,
    pub item_code: String,
    pub item_name: String,
    pub quantity: i64,
    pub requestor_email: String,
    pub job_id: String,
}

impl StockRequestForm {
    /// Names of required fields that are absent or blank, in form order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let text = [
            ("site_worker", &self.site_worker),
            ("request_date", &self.request_date),
            ("delivery_location", &self.delivery_location),
            ("item_code", &self.item_code),
            ("item_name", &self.item_name),
        ];
        let mut missing: Vec<&'static str> = text
            .iter()
            .filter(|(_, v)| v.as_deref().map_or(true, |s| s.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect();
        if self.quantity.is_none() {
            missing.push("quantity");
        }
        for (name, value) in [("requestor_email", &self.requestor_email), ("job_id", &self.job_id)] {
            if value.as_deref().map_or(true, |s| s.trim().is_empty()) {
                missing.push(name);
            }
        }
        missing
    }

    /// Validate required fields, trim and cap strings, default the urgency
    pub fn normalize(&self) -> Result<NewStockRequest, DomainError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(DomainError::validation(
                &missing.join(", "),
                "required field(s) missing",
            ));
        }

        let quantity = self
            .quantity
            .as_ref()
            .ok_or_else(|| DomainError::missing("quantity"))?
            .parse_positive("quantity")?;

        let request_date = parse_date(
            "request_date",
            self.request_date.as_deref().unwrap_or_default(),
        )?;

        Ok(NewStockRequest {
            site_worker: require_text("site_worker", self.site_worker.as_deref())?,
            request_date,
            delivery_location: require_text(
                "delivery_location",
                self.delivery_location.as_deref(),
            )?,
            urgency: optional_text(self.urgency.as_deref(), MAX_FIELD_LENGTH)
                .unwrap_or_else(|| DEFAULT_URGENCY.to_string()),
            item_code: require_text("item_code", self.item_code.as_deref())?,
            item_name: require_text("item_name", self.item_name.as_deref())?,
            quantity,
            requestor_email: require_text("requestor_email", self.requestor_email.as_deref())?,
            job_id: require_text("job_id", self.job_id.as_deref())?,
        })
    }
}
