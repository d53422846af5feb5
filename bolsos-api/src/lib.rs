//! bolsos-api library - REST surface for the bag catalog
//!
//! Exposes the router and state so integration tests can drive the service
//! without binding a socket.

use axum::Router;
use bolsos_common::BagStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod models;
pub mod service;
pub mod validation;

pub use crate::error::{ApiError, ApiResult};
pub use crate::service::BagService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Bag operations over the injected storage handle
    pub bags: BagService,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state around a storage handle
    pub fn new(store: Arc<dyn BagStore>) -> Self {
        Self {
            bags: BagService::new(store),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::get_service_info))
        .merge(api::bag_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
