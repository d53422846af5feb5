//! HTTP API handlers for bolsos-api

pub mod bags;
pub mod buildinfo;
pub mod health;

pub use bags::bag_routes;
pub use buildinfo::get_service_info;
pub use health::health_routes;
