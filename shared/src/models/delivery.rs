//! Delivery confirmation models
//!
//! A dispatch is confirmed independently by the driver and by the receiving
//! site worker. The site worker's confirmation marks the delivery complete
//! whether or not the driver has confirmed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Who is confirming a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationRole {
    Driver,
    #[serde(rename = "siteworker")]
    SiteWorker,
}

impl ConfirmationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmationRole::Driver => "driver",
            ConfirmationRole::SiteWorker => "siteworker",
        }
    }

    /// Parse a role name; anything but `driver` or `siteworker` is rejected
    pub fn parse(role: &str) -> Result<Self, DomainError> {
        match role.trim() {
            "driver" => Ok(ConfirmationRole::Driver),
            "siteworker" => Ok(ConfirmationRole::SiteWorker),
            other => Err(DomainError::InvalidRole(other.to_string())),
        }
    }
}

/// Derived delivery status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "VARCHAR"))]
pub enum DeliveryStatus {
    #[serde(rename = "Driver Confirmed")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Driver Confirmed"))]
    DriverConfirmed,
    Delivered,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::DriverConfirmed => "Driver Confirmed",
            DeliveryStatus::Delivered => "Delivered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Driver Confirmed" => Some(DeliveryStatus::DriverConfirmed),
            "Delivered" => Some(DeliveryStatus::Delivered),
            _ => None,
        }
    }
}

/// Stored confirmation state for one dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DeliveryConfirmation {
    pub dispatch_id: i64,
    pub driver_confirmation: Option<DateTime<Utc>>,
    pub site_worker_confirmation: Option<DateTime<Utc>>,
    pub delivery_status: DeliveryStatus,
}

impl DeliveryConfirmation {
    /// Apply a confirmation to the current state of a dispatch.
    ///
    /// `current` is `None` when nobody has confirmed yet. A driver confirmation
    /// records its timestamp and moves the status to "Driver Confirmed", except
    /// that "Delivered" is final. A site worker confirmation always yields
    /// "Delivered".
    pub fn apply(
        current: Option<&DeliveryConfirmation>,
        dispatch_id: i64,
        role: ConfirmationRole,
        at: DateTime<Utc>,
    ) -> DeliveryConfirmation {
        let mut next = current.cloned().unwrap_or(DeliveryConfirmation {
            dispatch_id,
            driver_confirmation: None,
            site_worker_confirmation: None,
            delivery_status: DeliveryStatus::DriverConfirmed,
        });

        match role {
            ConfirmationRole::Driver => {
                next.driver_confirmation = Some(at);
                if next.delivery_status != DeliveryStatus::Delivered {
                    next.delivery_status = DeliveryStatus::DriverConfirmed;
                }
            }
            ConfirmationRole::SiteWorker => {
                next.site_worker_confirmation = Some(at);
                next.delivery_status = DeliveryStatus::Delivered;
            }
        }
        next
    }
}
