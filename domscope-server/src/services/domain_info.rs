//! Domain enrichment service
//!
//! Orchestrates discovery (crt.sh + name filtering), batch enrichment and
//! persistence for the three operations exposed over HTTP: add a domain,
//! list stored records, refresh everything under the known roots.

use crate::db::domain_info;
use crate::db::RefreshedRecord;
use crate::enrichment::{
    filter_names, resolution_failure_message, BatchCollector, BatchOutcome, EnrichError,
    PendingRecord,
};
use crate::providers::{CertificateSource, ProviderError};
use domscope_common::db::DomainRecord;
use domscope_common::normalize_domain;
use futures::future::join_all;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Service operation errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A record with this name is already stored
    #[error("Domain already exists: {0}")]
    Duplicate(String),

    /// The requested domain has no address
    #[error("{message}")]
    Resolution { domain: String, message: String },

    /// An upstream provider failed while handling the requested domain
    #[error(transparent)]
    Upstream(#[from] ProviderError),

    #[error(transparent)]
    Common(#[from] domscope_common::Error),
}

/// Outcome of a refresh pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    /// Root domains found in storage
    pub roots: usize,
    /// Roots whose discovery failed (left out of this pass)
    pub failed_roots: Vec<String>,
    /// Distinct host names discovered across all roots
    pub candidates: usize,
    pub updated: usize,
    pub inserted: usize,
    /// Host names whose enrichment failed
    pub failed: usize,
}

pub struct EnrichmentService {
    db: SqlitePool,
    certificates: Arc<dyn CertificateSource>,
    collector: BatchCollector,
}

impl EnrichmentService {
    pub fn new(
        db: SqlitePool,
        certificates: Arc<dyn CertificateSource>,
        collector: BatchCollector,
    ) -> Self {
        Self {
            db,
            certificates,
            collector,
        }
    }

    /// Host names under `root` known to certificate transparency logs,
    /// always including `root`
    pub async fn discover(&self, root: &str) -> Result<BTreeSet<String>, ProviderError> {
        let entries = self.certificates.search(root).await?;
        let names = filter_names(root, &entries);

        info!(root = %root, candidates = names.len(), "Discovered host names");

        Ok(names)
    }

    /// Discover, enrich and store `domain_name` and its subdomains
    ///
    /// Returns the rows written. Subdomains that fail enrichment or are
    /// already stored are left out; the domain itself must succeed.
    pub async fn add_domain(&self, domain_name: &str) -> Result<Vec<DomainRecord>, ServiceError> {
        let domain = normalize_domain(domain_name);
        if domain.is_empty() {
            return Err(domscope_common::Error::InvalidInput(
                "Domain name must not be empty".to_string(),
            )
            .into());
        }

        if domain_info::find_by_name(&self.db, &domain).await?.is_some() {
            return Err(ServiceError::Duplicate(domain));
        }

        let candidates: Vec<String> = self.discover(&domain).await?.into_iter().collect();
        let BatchOutcome {
            successes,
            failures,
        } = self.collector.collect(&candidates).await;

        if let Some(failure) = failures.into_iter().find(|f| f.hostname == domain) {
            return Err(apex_failure(&domain, failure.error));
        }

        let (apex, others): (Vec<PendingRecord>, Vec<PendingRecord>) = successes
            .into_iter()
            .partition(|record| record.domain_name == domain);

        let apex = apex.into_iter().next().ok_or_else(|| {
            domscope_common::Error::Internal(format!("No enrichment result for {}", domain))
        })?;

        let records = match domain_info::bulk_insert(&self.db, &apex, &others).await {
            Ok(records) => records,
            // A concurrent add of the same name committed first
            Err(e) if e.is_unique_violation() => return Err(ServiceError::Duplicate(domain)),
            Err(e) => return Err(e.into()),
        };

        info!(
            domain = %domain,
            stored = records.len(),
            candidates = candidates.len(),
            "Added domain"
        );

        Ok(records)
    }

    /// One page of stored records ordered by name, with the total count
    pub async fn list_domains(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(i64, Vec<DomainRecord>), ServiceError> {
        Ok(domain_info::list_paged(&self.db, limit, offset).await?)
    }

    /// Rediscover and re-enrich every host name under the stored roots
    ///
    /// Per-root discovery failures and per-host enrichment failures are
    /// logged and reported in the summary; they never fail the pass.
    pub async fn refresh_all(&self) -> Result<RefreshSummary, ServiceError> {
        let roots = domain_info::list_root_names(&self.db).await?;
        let mut summary = RefreshSummary {
            roots: roots.len(),
            ..RefreshSummary::default()
        };

        if roots.is_empty() {
            info!("No root domains stored, nothing to refresh");
            return Ok(summary);
        }

        let discoveries = join_all(roots.iter().map(|root| self.discover(root))).await;

        let mut candidates = BTreeSet::new();
        for (root, result) in roots.iter().zip(discoveries) {
            match result {
                Ok(names) => candidates.extend(names),
                Err(e) => {
                    warn!(root = %root, error = %e, "Discovery failed, skipping root");
                    summary.failed_roots.push(root.clone());
                }
            }
        }

        summary.candidates = candidates.len();
        if candidates.is_empty() {
            info!(
                failed_roots = summary.failed_roots.len(),
                "No host names discovered, nothing to refresh"
            );
            return Ok(summary);
        }

        let identities = domain_info::list_name_identity_pairs(&self.db).await?;
        let hostnames: Vec<String> = candidates.into_iter().collect();

        let outcome = self.collector.collect(&hostnames).await;
        summary.failed = outcome.failures.len();

        let refreshed = attach_identities(outcome.successes, &identities);
        if !refreshed.is_empty() {
            let counts = domain_info::bulk_upsert(&self.db, &refreshed).await?;
            summary.updated = counts.updated;
            summary.inserted = counts.inserted;
        }

        info!(
            roots = summary.roots,
            failed_roots = summary.failed_roots.len(),
            candidates = summary.candidates,
            updated = summary.updated,
            inserted = summary.inserted,
            failed = summary.failed,
            "Refresh complete"
        );

        Ok(summary)
    }
}

/// Pair each refreshed record with the stored identity of its name, if any
fn attach_identities(
    records: Vec<PendingRecord>,
    identities: &HashMap<String, Uuid>,
) -> Vec<RefreshedRecord> {
    records
        .into_iter()
        .map(|record| RefreshedRecord {
            id: identities.get(&record.domain_name).copied(),
            record,
        })
        .collect()
}

fn apex_failure(domain: &str, error: EnrichError) -> ServiceError {
    match error {
        EnrichError::Resolution { .. } => ServiceError::Resolution {
            domain: domain.to_string(),
            message: resolution_failure_message(domain),
        },
        EnrichError::Provider(e) => ServiceError::Upstream(e),
        EnrichError::Worker(message) => domscope_common::Error::Internal(message).into(),
    }
}
