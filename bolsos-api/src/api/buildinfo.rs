//! Service banner endpoint
//!
//! Returns version and build metadata; does not touch storage.

use axum::response::Json;
use serde::Serialize;

/// Service banner response
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
}

/// GET /
pub async fn get_service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "bolsos-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        build_profile: env!("BUILD_PROFILE").to_string(),
    })
}
