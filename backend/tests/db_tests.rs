//! Workflow tests against the real schema
//!
//! Each test gets a fresh database with the migrations applied, so they need
//! `DATABASE_URL` to point at a Postgres server the tests may create
//! databases on.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shared::{Alert, QuantityInput, RequestStatus, StockRequest, StockRequestForm};
use sqlx::PgPool;
use stockyard::{
    create_app,
    error::AppError,
    services::{
        dispatch::DispatchInput, inventory::AddEntryInput, stock_request::DecisionInput,
        AlertService, DispatchService, InventoryService, StockRequestService, SubmissionPolicy,
    },
    AppState, Config,
};
use tower::ServiceExt;

const THRESHOLD: i64 = 3;

async fn add(pool: &PgPool, item_code: &str, quantity: i64) {
    InventoryService::new(pool.clone(), THRESHOLD)
        .add_entry(AddEntryInput {
            item_code: Some(item_code.to_string()),
            item_name: Some("Bolts".to_string()),
            quantity: Some(QuantityInput::Integer(quantity)),
            description: Some("M8 bolts".to_string()),
            stock_entry_time: None,
        })
        .await
        .unwrap();
}

fn dispatch_input(item_code: &str, quantity: i64) -> DispatchInput {
    DispatchInput {
        manager_id: 1,
        request_id: None,
        driver_id: 2,
        dispatch_date: Some("2024-06-01 08:00:00".to_string()),
        items_dispatched: Some(item_code.to_string()),
        dispatched_qty: quantity,
    }
}

async fn dispatch(pool: &PgPool, item_code: &str, quantity: i64) -> Result<i64, AppError> {
    DispatchService::new(pool.clone(), THRESHOLD)
        .dispatch(dispatch_input(item_code, quantity))
        .await
        .map(|outcome| outcome.dispatch.id)
}

async fn alerts_for(pool: &PgPool, item_code: &str) -> Vec<Alert> {
    AlertService::new(pool.clone())
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.item_code == item_code)
        .collect()
}

fn request_form(item_code: &str) -> StockRequestForm {
    StockRequestForm {
        site_worker: Some("Dana".to_string()),
        request_date: Some("2024-06-01".to_string()),
        delivery_location: Some("Site A".to_string()),
        urgency: None,
        item_code: Some(item_code.to_string()),
        item_name: Some("Bolts".to_string()),
        quantity: Some(QuantityInput::Integer(2)),
        requestor_email: Some("dana@example.com".to_string()),
        job_id: Some("J-17".to_string()),
    }
}

fn requests(pool: &PgPool, settle_alert_on_submit: bool) -> StockRequestService {
    StockRequestService::new(
        pool.clone(),
        SubmissionPolicy {
            low_stock_threshold: THRESHOLD,
            settle_alert_on_submit,
        },
    )
}

fn decision(by: &str) -> DecisionInput {
    DecisionInput {
        decision_by: Some(by.to_string()),
        decision_time: Some("2024-06-01 10:00:00".to_string()),
    }
}

fn app(pool: PgPool) -> Router {
    let mut config = Config::default();
    config.auth.enabled = false;
    create_app(AppState::new(pool, config).unwrap())
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn dispatch_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM dispatches")
        .fetch_one(pool)
        .await
        .unwrap()
}

// ============================================================================
// Inventory and dispatch
// ============================================================================

/// Add 5 of X1, dispatch 5, then restock 3
#[sqlx::test(migrations = "./migrations")]
async fn drain_raises_alert_and_restock_settles_it(pool: PgPool) {
    let inventory = InventoryService::new(pool.clone(), THRESHOLD);

    add(&pool, "X1", 5).await;
    dispatch(&pool, "X1", 5).await.unwrap();
    assert_eq!(inventory.aggregate("X1").await.unwrap(), 0);

    let unsettled = AlertService::new(pool.clone()).list_unsettled().await.unwrap();
    assert_eq!(unsettled.len(), 1);
    assert_eq!(unsettled[0].item_code, "X1");
    assert!(unsettled[0].message.contains("0 unit(s)"));

    add(&pool, "X1", 3).await;
    assert_eq!(inventory.aggregate("X1").await.unwrap(), 3);

    let alerts = alerts_for(&pool, "X1").await;
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].settled);
    assert!(alerts[0].settled_time.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn over_dispatch_rolls_back(pool: PgPool) {
    add(&pool, "X2", 2).await;

    let err = dispatch(&pool, "X2", 4).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock { .. }));

    assert_eq!(dispatch_count(&pool).await, 0);
    let inventory = InventoryService::new(pool.clone(), THRESHOLD);
    assert_eq!(inventory.aggregate("X2").await.unwrap(), 2);
    assert!(alerts_for(&pool, "X2").await.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn dispatch_draws_newest_entry_first(pool: PgPool) {
    InventoryService::new(pool.clone(), THRESHOLD)
        .add_entry(AddEntryInput {
            item_code: Some("X3".to_string()),
            item_name: Some("Bolts".to_string()),
            quantity: Some(QuantityInput::Integer(5)),
            description: Some("old batch".to_string()),
            stock_entry_time: Some("2024-01-01 08:00:00".to_string()),
        })
        .await
        .unwrap();
    add(&pool, "X3", 2).await;

    dispatch(&pool, "X3", 3).await.unwrap();

    let item = InventoryService::new(pool.clone(), THRESHOLD)
        .get_item("X3")
        .await
        .unwrap();
    assert_eq!(item.quantity, 4);
    let quantities: Vec<i64> = item.entries.iter().map(|e| e.quantity).collect();
    assert_eq!(quantities, vec![0, 4]);
}

#[sqlx::test(migrations = "./migrations")]
async fn dispatch_for_unknown_request_is_not_found(pool: PgPool) {
    add(&pool, "X4", 5).await;
    let mut input = dispatch_input("X4", 1);
    input.request_id = Some(999);

    let err = DispatchService::new(pool.clone(), THRESHOLD)
        .dispatch(input)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(dispatch_count(&pool).await, 0);
}

// ============================================================================
// Alerts
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
async fn reraised_alert_reopens_the_same_row(pool: PgPool) {
    add(&pool, "X5", 5).await;
    dispatch(&pool, "X5", 4).await.unwrap();
    let first = alerts_for(&pool, "X5").await;
    assert_eq!(first.len(), 1);

    AlertService::new(pool.clone())
        .mark_read(first[0].id)
        .await
        .unwrap();
    add(&pool, "X5", 4).await;
    assert!(alerts_for(&pool, "X5").await[0].settled);

    dispatch(&pool, "X5", 4).await.unwrap();

    let reopened = alerts_for(&pool, "X5").await;
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened[0].id, first[0].id);
    assert!(!reopened[0].settled);
    assert!(!reopened[0].is_read);
    assert!(reopened[0].settled_time.is_none());
    assert!(reopened[0].message.contains("1 unit(s)"));
}

// ============================================================================
// Stock requests
// ============================================================================

/// Raise an alert on `item_code`, then restock it without going through `add_entry`
async fn alert_with_recovered_stock(pool: &PgPool, item_code: &str) {
    add(pool, item_code, 3).await;
    dispatch(pool, item_code, 2).await.unwrap();
    sqlx::query(
        "INSERT INTO inventory (item_code, item_name, quantity, description, entry_time)
         VALUES ($1, 'Bolts', 5, 'restock', NOW())",
    )
    .bind(item_code)
    .execute(pool)
    .await
    .unwrap();
    assert!(!alerts_for(pool, item_code).await[0].settled);
}

#[sqlx::test(migrations = "./migrations")]
async fn submission_settles_recovered_alert(pool: PgPool) {
    alert_with_recovered_stock(&pool, "X6").await;

    let request = requests(&pool, true).submit(request_form("X6")).await.unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.approval_status, RequestStatus::Pending);

    assert!(alerts_for(&pool, "X6").await[0].settled);
}

#[sqlx::test(migrations = "./migrations")]
async fn submission_leaves_alert_when_settling_is_disabled(pool: PgPool) {
    alert_with_recovered_stock(&pool, "X7").await;

    requests(&pool, false).submit(request_form("X7")).await.unwrap();

    assert!(!alerts_for(&pool, "X7").await[0].settled);
}

#[sqlx::test(migrations = "./migrations")]
async fn decision_is_one_way(pool: PgPool) {
    let service = requests(&pool, true);
    let request = service.submit(request_form("X8")).await.unwrap();

    let approved: StockRequest = service
        .decide(request.id, RequestStatus::Approved, decision("Sam"))
        .await
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.approval_status, RequestStatus::Approved);
    assert_eq!(approved.decision_by.as_deref(), Some("Sam"));

    let err = service
        .decide(request.id, RequestStatus::Rejected, decision("Sam"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition(_)));
    assert_eq!(
        service.get(request.id).await.unwrap().approval_status,
        RequestStatus::Approved
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn deciding_unknown_request_is_not_found(pool: PgPool) {
    let err = requests(&pool, true)
        .decide(404, RequestStatus::Approved, decision("Sam"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn long_decider_name_is_trimmed_and_capped(pool: PgPool) {
    let service = requests(&pool, true);
    let request = service.submit(request_form("X9")).await.unwrap();
    let long_name = format!("  {}  ", "n".repeat(80));

    let rejected = service
        .decide(request.id, RequestStatus::Rejected, decision(&long_name))
        .await
        .unwrap();
    assert_eq!(rejected.decision_by, Some("n".repeat(50)));
}

// ============================================================================
// HTTP surface
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
async fn driver_then_siteworker_confirmation(pool: PgPool) {
    add(&pool, "Y1", 5).await;
    let dispatch_id = dispatch(&pool, "Y1", 1).await.unwrap();

    let (status, body) = send(
        app(pool.clone()),
        Method::POST,
        "/api/delivery/confirm",
        Some(json!({ "id": dispatch_id, "role": "driver", "confirmationTime": "2024-06-02 09:00:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["delivery_status"], "Driver Confirmed");

    let (status, body) = send(
        app(pool.clone()),
        Method::POST,
        "/api/delivery/confirm",
        Some(json!({ "id": dispatch_id, "role": "siteworker", "confirmationTime": "2024-06-02 11:00:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivery_status"], "Delivered");
    assert!(body["driver_confirmation"].is_string());
    assert!(body["site_worker_confirmation"].is_string());

    let rows = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM delivery_confirmations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn confirming_unknown_dispatch_is_not_found(pool: PgPool) {
    let (status, body) = send(
        app(pool),
        Method::POST,
        "/api/delivery/confirm",
        Some(json!({ "id": 77, "role": "driver", "confirmationTime": "2024-06-02 09:00:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "./migrations")]
async fn lowstock_lists_rows_unless_items_are_asked_for(pool: PgPool) {
    add(&pool, "Y2", 1).await;
    add(&pool, "Y2", 1).await;
    add(&pool, "Y3", 9).await;

    let (status, rows) = send(app(pool.clone()), Method::GET, "/api/inventory/lowstock", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["item_code"] == "Y2" && r["id"].is_i64()));

    let (status, items) = send(
        app(pool.clone()),
        Method::GET,
        "/api/inventory/lowstock?view=items",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items, json!([{
        "item_code": "Y2",
        "item_name": "Bolts",
        "quantity": 2,
        "description": "M8 bolts"
    }]));
}

#[sqlx::test(migrations = "./migrations")]
async fn blank_description_stores_nothing(pool: PgPool) {
    let (status, body) = send(
        app(pool.clone()),
        Method::POST,
        "/api/inventory",
        Some(json!({ "itemCode": "Y4", "itemName": "Bolts", "quantity": 4, "description": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "description");

    let rows = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM inventory")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}
