//! Concurrent record building for many host names

use super::{EnrichError, PendingRecord, RecordBuilder};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

/// Host name whose record could not be built
#[derive(Debug)]
pub struct BatchFailure {
    pub hostname: String,
    pub error: EnrichError,
}

/// Result of one batch: successes in input order, failures alongside
///
/// `successes.len() + failures.len()` always equals the number of inputs.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub successes: Vec<PendingRecord>,
    pub failures: Vec<BatchFailure>,
}

pub struct BatchCollector {
    builder: Arc<RecordBuilder>,
    max_concurrency: usize,
}

impl BatchCollector {
    /// `max_concurrency` of 0 is treated as 1
    pub fn new(builder: Arc<RecordBuilder>, max_concurrency: usize) -> Self {
        Self {
            builder,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Build a record for every host name; one failure never aborts the rest
    pub async fn collect(&self, hostnames: &[String]) -> BatchOutcome {
        if hostnames.is_empty() {
            return BatchOutcome::default();
        }

        // Owned futures keep the batch Send for spawned tasks and handlers
        let builds: Vec<_> = hostnames
            .iter()
            .map(|host| {
                let builder = Arc::clone(&self.builder);
                let host = host.clone();
                async move { builder.build(&host).await }
            })
            .collect();

        let results: Vec<Result<PendingRecord, EnrichError>> = stream::iter(builds)
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut outcome = BatchOutcome::default();

        for (host, result) in hostnames.iter().zip(results) {
            match result {
                Ok(record) => outcome.successes.push(record),
                Err(error) => {
                    warn!(host = %host, error = %error, "Failed to enrich host");
                    outcome.failures.push(BatchFailure {
                        hostname: host.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            total = hostnames.len(),
            succeeded = outcome.successes.len(),
            failed = outcome.failures.len(),
            "Enrichment batch complete"
        );

        outcome
    }
}
