//! Stockyard - warehouse stock workflow server
//!
//! Site workers request stock, managers approve and dispatch it, drivers and
//! site workers confirm delivery. Inventory is a ledger of entries drawn down
//! newest first, with a deduplicated low-stock alert per item.

use std::sync::Arc;

use axum::{http::Request, routing::get, Router};
use shared::PermissionTable;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use crate::config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub permissions: Arc<PermissionTable>,
}

impl AppState {
    /// Build state from a pool and loaded configuration
    pub fn new(db: sqlx::PgPool, config: Config) -> Result<Self, ::config::ConfigError> {
        let permissions = config.permission_table()?;
        Ok(Self {
            db,
            config: Arc::new(config),
            permissions: Arc::new(permissions),
        })
    }
}

/// Request ids are random UUIDs
#[derive(Clone, Copy, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api", routes::api_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Stockyard API v0.1"
}
