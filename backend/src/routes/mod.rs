//! Route definitions for the Stockyard API

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes; every route requires an authenticated user
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/request_stock", request_routes())
        .nest("/inventory", inventory_routes())
        .nest("/dispatches", dispatch_routes())
        .nest("/delivery", delivery_routes())
        .nest("/alerts", alert_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Stock request routes
fn request_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_requests).post(handlers::submit_request),
        )
        .route("/:request_id", get(handlers::get_request))
        .route("/:request_id/approve", put(handlers::approve_request))
        .route("/:request_id/reject", put(handlers::reject_request))
}

/// Inventory ledger routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_inventory).post(handlers::add_entry))
        .route("/lowstock", get(handlers::list_low_stock))
        .route("/:item_code", get(handlers::get_item))
}

/// Dispatch routes
fn dispatch_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_dispatches).post(handlers::create_dispatch),
        )
        .route("/:dispatch_id", get(handlers::get_dispatch))
}

/// Delivery confirmation routes
fn delivery_routes() -> Router<AppState> {
    Router::new()
        .route("/confirm", post(handlers::confirm_delivery))
        .route("/:dispatch_id", get(handlers::get_delivery))
}

/// Alert routes
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_alerts))
        .route("/:alert_id/read", put(handlers::mark_alert_read))
}
