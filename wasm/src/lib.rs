//! WebAssembly module for Stockyard
//!
//! Provides client-side previews for the browser UI:
//! - Stock request form validation
//! - Dispatch deduction planning
//! - Delivery status transitions
//! - Low-stock checks

use chrono::{DateTime, Utc};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("stockyard wasm helpers loaded"));
}

fn js_error(message: String) -> JsValue {
    js_sys::Error::new(&message).into()
}

/// Whether an aggregate quantity is below the low-stock threshold
#[wasm_bindgen]
pub fn stock_is_low(total: i64, threshold: i64) -> bool {
    is_low_stock(total, threshold)
}

/// Normalize a stock request form; returns the normalized request as JSON
#[wasm_bindgen]
pub fn validate_stock_request(form_json: &str) -> Result<String, JsValue> {
    normalize_request_json(form_json).map_err(js_error)
}

/// Required fields missing from a stock request form, as a JSON array
#[wasm_bindgen]
pub fn missing_request_fields(form_json: &str) -> Result<String, JsValue> {
    missing_fields_json(form_json).map_err(js_error)
}

/// Preview how a dispatch would draw down ledger entries (newest first)
#[wasm_bindgen]
pub fn preview_dispatch(item_code: &str, batches_json: &str, requested: i64) -> Result<String, JsValue> {
    deduction_plan_json(item_code, batches_json, requested).map_err(js_error)
}

/// Delivery status after a confirmation by `role` (`driver` or `siteworker`)
#[wasm_bindgen]
pub fn next_delivery_status(current: Option<String>, role: &str) -> Result<String, JsValue> {
    next_status(current.as_deref(), role).map_err(js_error)
}

/// Trim a free-text form field and cap it at the stored length
#[wasm_bindgen]
pub fn normalize_field(value: &str) -> String {
    trim_and_cap(value, MAX_FIELD_LENGTH)
}

fn normalize_request_json(form_json: &str) -> Result<String, String> {
    let form: StockRequestForm =
        serde_json::from_str(form_json).map_err(|e| format!("Invalid form JSON: {}", e))?;
    let request = form.normalize().map_err(|e| e.to_string())?;
    serde_json::to_string(&request).map_err(|e| e.to_string())
}

fn missing_fields_json(form_json: &str) -> Result<String, String> {
    let form: StockRequestForm =
        serde_json::from_str(form_json).map_err(|e| format!("Invalid form JSON: {}", e))?;
    serde_json::to_string(&form.missing_fields()).map_err(|e| e.to_string())
}

fn deduction_plan_json(item_code: &str, batches_json: &str, requested: i64) -> Result<String, String> {
    let batches: Vec<StockBatch> =
        serde_json::from_str(batches_json).map_err(|e| format!("Invalid batches JSON: {}", e))?;
    let plan = plan_deduction(item_code, &batches, requested).map_err(|e| e.to_string())?;
    serde_json::to_string(&plan).map_err(|e| e.to_string())
}

fn next_status(current: Option<&str>, role: &str) -> Result<String, String> {
    let role = ConfirmationRole::parse(role).map_err(|e| e.to_string())?;
    let current = match current {
        Some(status) => Some(
            DeliveryStatus::from_str(status)
                .ok_or_else(|| format!("Unknown delivery status '{}'", status))?,
        ),
        None => None,
    };

    // Only the status matters for the preview; timestamps are placeholders
    let existing = current.map(|delivery_status| DeliveryConfirmation {
        dispatch_id: 0,
        driver_confirmation: None,
        site_worker_confirmation: None,
        delivery_status,
    });
    let next = DeliveryConfirmation::apply(existing.as_ref(), 0, role, DateTime::<Utc>::default());
    Ok(next.delivery_status.as_str().to_string())
}
