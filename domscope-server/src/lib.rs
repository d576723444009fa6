//! domscope-server library interface
//!
//! Subdomain discovery and enrichment service: crt.sh discovery, address
//! resolution, geolocation, DNS records, stored in SQLite and served over
//! HTTP.

pub mod api;
pub mod db;
pub mod enrichment;
pub mod error;
pub mod providers;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::{http::HeaderValue, Router};
use chrono::{DateTime, Utc};
use domscope_common::config::{CorsConfig, TomlConfig};
use enrichment::{
    BatchCollector, DnsProbe, GeoEnricher, HickoryDnsLookup, RecordBuilder, SystemResolver,
};
use providers::{CrtShClient, IpInfoClient, IpWhoIsClient, ProviderError};
use services::EnrichmentService;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub service: Arc<EnrichmentService>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, service: Arc<EnrichmentService>) -> Self {
        Self {
            db,
            service,
            startup_time: Utc::now(),
        }
    }
}

/// Wire the enrichment service to the live providers named in `config`
pub fn build_service(
    db: SqlitePool,
    config: &TomlConfig,
) -> Result<Arc<EnrichmentService>, ProviderError> {
    let providers = &config.providers;

    let geo = GeoEnricher::new(
        Arc::new(IpWhoIsClient::new(&providers.ip_who_is)?),
        Arc::new(IpInfoClient::new(&providers.ip_info)?),
    );
    let dns = DnsProbe::new(Arc::new(HickoryDnsLookup::from_system_conf()));
    let builder = RecordBuilder::new(Arc::new(SystemResolver), dns, geo);
    let collector = BatchCollector::new(Arc::new(builder), config.enrichment.max_concurrency);

    Ok(Arc::new(EnrichmentService::new(
        db,
        Arc::new(CrtShClient::new(&providers.crt_sh)?),
        collector,
    )))
}

/// CORS policy for the configured origins
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allows_any() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Build application router
///
/// Domain routes live under `/api`; `/health` stays at the root.
pub fn build_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .nest("/api", api::domain_info_routes())
        .merge(api::health_routes())
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
