//! Domain info endpoints
//!
//! - `GET /api/domain-info`: paged listing
//! - `POST /api/domain-info`: discover, enrich and store a domain
//! - `POST /api/domain-info/refresh`: refresh everything under the stored roots

use crate::services::RefreshSummary;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use domscope_common::db::DomainRecord;
use domscope_common::normalize_domain;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Query parameters for GET /api/domain-info
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListParams {
    /// Limit clamped to 1..=1000 (default 100) and a non-negative offset
    fn page(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub items: Vec<DomainRecord>,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct AddDomainRequest {
    pub domain_name: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub summary: RefreshSummary,
}

/// GET /api/domain-info?limit=&offset=
pub async fn list_domains(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<ListResponse>> {
    let (limit, offset) = params.page();
    let (total, items) = state.service.list_domains(limit, offset).await?;

    Ok(Json(ListResponse { items, total }))
}

/// POST /api/domain-info
///
/// **Request:** `{"domain_name": "example.com"}`. URLs and `user@host:port`
/// forms are reduced to the bare host name.
///
/// **Errors:**
/// - 400: empty name, or the name does not resolve
/// - 409: the name is already stored
/// - 502: crt.sh or a geolocation provider failed for the name itself
pub async fn add_domain(
    State(state): State<AppState>,
    Json(payload): Json<AddDomainRequest>,
) -> ApiResult<(StatusCode, Json<Vec<DomainRecord>>)> {
    let domain = normalize_domain(&payload.domain_name);
    if domain.is_empty() {
        return Err(ApiError::BadRequest(
            "domain_name must not be empty".to_string(),
        ));
    }

    info!(domain = %domain, "Add domain requested");

    let records = state.service.add_domain(&domain).await?;

    Ok((StatusCode::CREATED, Json(records)))
}

/// POST /api/domain-info/refresh
pub async fn refresh_domains(State(state): State<AppState>) -> ApiResult<Json<RefreshResponse>> {
    info!("Refresh requested");

    let summary = state.service.refresh_all().await?;

    Ok(Json(RefreshResponse {
        status: "ok",
        summary,
    }))
}

/// Build domain info routes
pub fn domain_info_routes() -> Router<AppState> {
    Router::new()
        .route("/domain-info", get(list_domains).post(add_domain))
        .route("/domain-info/refresh", post(refresh_domains))
}
