//! DNS record probe
//!
//! Queries the fixed record type vocabulary for a host name. Each type is an
//! independent lookup: a failure is logged and the type is left out of the
//! result, it never affects the other lookups or the caller.

use async_trait::async_trait;
use domscope_common::db::DnsSettings;
use futures::future::join_all;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioResolver;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Record types collected for every host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsRecordType {
    A,
    Aaaa,
    Mx,
    Ns,
    Cname,
    Soa,
    Txt,
}

impl DnsRecordType {
    pub const ALL: [DnsRecordType; 7] = [
        DnsRecordType::A,
        DnsRecordType::Aaaa,
        DnsRecordType::Mx,
        DnsRecordType::Ns,
        DnsRecordType::Cname,
        DnsRecordType::Soa,
        DnsRecordType::Txt,
    ];

    /// Key used in `dns_settings`
    pub fn as_str(&self) -> &'static str {
        match self {
            DnsRecordType::A => "A",
            DnsRecordType::Aaaa => "AAAA",
            DnsRecordType::Mx => "MX",
            DnsRecordType::Ns => "NS",
            DnsRecordType::Cname => "CNAME",
            DnsRecordType::Soa => "SOA",
            DnsRecordType::Txt => "TXT",
        }
    }
}

impl fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DnsRecordType> for RecordType {
    fn from(value: DnsRecordType) -> Self {
        match value {
            DnsRecordType::A => RecordType::A,
            DnsRecordType::Aaaa => RecordType::AAAA,
            DnsRecordType::Mx => RecordType::MX,
            DnsRecordType::Ns => RecordType::NS,
            DnsRecordType::Cname => RecordType::CNAME,
            DnsRecordType::Soa => RecordType::SOA,
            DnsRecordType::Txt => RecordType::TXT,
        }
    }
}

/// A single failed record lookup
#[derive(Debug, Error)]
#[error("{record_type} lookup for {host} failed: {message}")]
pub struct DnsLookupError {
    pub host: String,
    pub record_type: DnsRecordType,
    pub message: String,
}

/// One record type query against a resolver
#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// Answers of type `record_type` for `host`, rendered as zone-file text
    async fn lookup(
        &self,
        host: &str,
        record_type: DnsRecordType,
    ) -> Result<Vec<String>, DnsLookupError>;
}

/// `DnsLookup` backed by hickory's async resolver
pub struct HickoryDnsLookup {
    resolver: TokioResolver,
}

impl HickoryDnsLookup {
    /// Resolver using the host's system configuration (`/etc/resolv.conf`)
    ///
    /// Falls back to hickory's default upstream servers when the system
    /// configuration cannot be read.
    pub fn from_system_conf() -> Self {
        let resolver = match TokioResolver::builder(TokioConnectionProvider::default()) {
            Ok(builder) => builder.build(),
            Err(e) => {
                warn!("Failed to read system resolver config ({}), using defaults", e);
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
                .build()
            }
        };

        Self { resolver }
    }
}

#[async_trait]
impl DnsLookup for HickoryDnsLookup {
    async fn lookup(
        &self,
        host: &str,
        record_type: DnsRecordType,
    ) -> Result<Vec<String>, DnsLookupError> {
        // Absolute name: no search-domain expansion
        let fqdn = format!("{}.", host.trim_end_matches('.'));
        let wanted = RecordType::from(record_type);

        let lookup = self
            .resolver
            .lookup(fqdn.as_str(), wanted)
            .await
            .map_err(|e| DnsLookupError {
                host: host.to_string(),
                record_type,
                message: e.to_string(),
            })?;

        // CNAME records preceding the answer belong to the chain, not the type
        Ok(lookup
            .record_iter()
            .filter(|record| record.record_type() == wanted)
            .map(|record| record.data().to_string())
            .collect())
    }
}

/// Collects the record type map for host names
#[derive(Clone)]
pub struct DnsProbe {
    lookup: Arc<dyn DnsLookup>,
}

impl DnsProbe {
    pub fn new(lookup: Arc<dyn DnsLookup>) -> Self {
        Self { lookup }
    }

    /// All seven lookups, run concurrently; infallible
    pub async fn probe(&self, host: &str) -> DnsSettings {
        let lookups = DnsRecordType::ALL.into_iter().map(|record_type| async move {
            (record_type, self.lookup.lookup(host, record_type).await)
        });

        let mut settings = DnsSettings::new();

        for (record_type, result) in join_all(lookups).await {
            match result {
                Ok(values) if values.is_empty() => {
                    debug!(host = %host, record_type = %record_type, "No records");
                }
                Ok(values) => {
                    settings.insert(record_type.as_str().to_string(), values);
                }
                Err(e) => {
                    warn!(
                        host = %host,
                        record_type = %record_type,
                        error = %e.message,
                        "Failed to resolve record type"
                    );
                }
            }
        }

        settings
    }
}
