//! HTTP API handlers for domscope-server

pub mod domain_info;
pub mod health;

pub use domain_info::domain_info_routes;
pub use health::health_routes;
