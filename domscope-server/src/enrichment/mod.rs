//! Domain enrichment pipeline
//!
//! Host name in, pending `domain_info` row out:
//! resolve the address, then run the geolocation lookup, the DNS probe and the
//! root/subdomain classification concurrently. `BatchCollector` runs that for
//! many names with bounded concurrency and keeps per-name failures apart from
//! the successes.

pub mod batch;
pub mod classifier;
pub mod dns_probe;
pub mod geo;
pub mod name_filter;
pub mod record_builder;
pub mod resolver;

pub use batch::{BatchCollector, BatchFailure, BatchOutcome};
pub use classifier::classify;
pub use dns_probe::{DnsLookup, DnsLookupError, DnsProbe, DnsRecordType, HickoryDnsLookup};
pub use geo::{GeoEnricher, GeoFacts};
pub use name_filter::filter_names;
pub use record_builder::{PendingRecord, RecordBuilder};
pub use resolver::{HostResolver, SystemResolver};

use crate::providers::ProviderError;
use std::io;
use thiserror::Error;

/// Failure to build a record for one host name
#[derive(Debug, Error)]
pub enum EnrichError {
    /// The host name has no address
    #[error("Failed to resolve {host}: {source}")]
    Resolution {
        host: String,
        #[source]
        source: io::Error,
    },

    /// A geolocation provider call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A blocking task panicked or was cancelled
    #[error("Worker task failed: {0}")]
    Worker(String),
}

impl EnrichError {
    pub fn is_resolution(&self) -> bool {
        matches!(self, EnrichError::Resolution { .. })
    }
}

/// Message shown to users when a domain name does not resolve
pub fn resolution_failure_message(domain: &str) -> String {
    format!(
        "Failed to determine IP for the address: {}\n\n\
         Possible reasons:\n\
         \u{2022} the domain does not exist\n\
         \u{2022} the domain is entered incorrectly\n\
         \u{2022} the DNS server did not respond",
        domain
    )
}
