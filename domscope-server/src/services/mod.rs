//! Service layer
//!
//! - `domain_info`: add / list / refresh orchestration over the enrichment
//!   pipeline and storage
//! - `refresh_task`: optional periodic refresh loop

pub mod domain_info;
pub mod refresh_task;

pub use domain_info::{EnrichmentService, RefreshSummary, ServiceError};
pub use refresh_task::spawn_refresh_task;
