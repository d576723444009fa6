//! Test Helper Utilities
//!
//! Stub providers and a service wired to an in-memory database, so the
//! enrichment flow runs without network access.

#![allow(dead_code)]

use async_trait::async_trait;
use domscope_common::config::CorsConfig;
use domscope_server::enrichment::{
    BatchCollector, DnsLookup, DnsLookupError, DnsProbe, DnsRecordType, EnrichError,
    GeoEnricher, HostResolver, RecordBuilder,
};
use domscope_server::providers::{
    CertificateEntry, CertificateSource, IpIntelligence, ProviderError,
};
use domscope_server::services::EnrichmentService;
use domscope_server::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::io;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

/// crt.sh stand-in: canned entries per root; roots listed in `failing`
/// return HTTP 503, unknown roots return no entries
#[derive(Default)]
pub struct StubCertificates {
    entries: Mutex<HashMap<String, Vec<CertificateEntry>>>,
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl StubCertificates {
    pub fn with_entries(self, root: &str, name_values: &[&str]) -> Self {
        self.set_entries(root, name_values);
        self
    }

    /// Replace the entries returned for `root`
    pub fn set_entries(&self, root: &str, name_values: &[&str]) {
        self.entries.lock().unwrap().insert(
            root.to_string(),
            name_values.iter().map(|n| CertificateEntry::new(*n)).collect(),
        );
    }

    pub fn failing_for(mut self, root: &str) -> Self {
        self.failing.push(root.to_string());
        self
    }

    /// Roots searched so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CertificateSource for StubCertificates {
    async fn search(&self, domain: &str) -> Result<Vec<CertificateEntry>, ProviderError> {
        self.calls.lock().unwrap().push(domain.to_string());

        if self.failing.iter().any(|root| root == domain) {
            return Err(ProviderError::Status {
                provider: "crt.sh",
                status: 503,
                body: json!({"message": "service unavailable"}),
            });
        }

        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or_default())
    }
}

/// Resolves only the host names it was given
#[derive(Default)]
pub struct StubResolver {
    addresses: Mutex<HashMap<String, IpAddr>>,
}

impl StubResolver {
    pub fn with_hosts(hosts: &[(&str, &str)]) -> Self {
        let resolver = Self::default();
        for (host, ip) in hosts {
            resolver.set(host, ip);
        }
        resolver
    }

    pub fn set(&self, host: &str, ip: &str) {
        self.addresses
            .lock()
            .unwrap()
            .insert(host.to_string(), ip.parse().unwrap());
    }
}

#[async_trait]
impl HostResolver for StubResolver {
    async fn resolve(&self, host: &str) -> Result<IpAddr, EnrichError> {
        self.addresses
            .lock()
            .unwrap()
            .get(host)
            .copied()
            .ok_or_else(|| EnrichError::Resolution {
                host: host.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "unknown host"),
            })
    }
}

/// Answers A queries with a fixed address; every other type is NXDOMAIN
pub struct StubDns;

#[async_trait]
impl DnsLookup for StubDns {
    async fn lookup(
        &self,
        host: &str,
        record_type: DnsRecordType,
    ) -> Result<Vec<String>, DnsLookupError> {
        match record_type {
            DnsRecordType::A => Ok(vec!["1.2.3.4".to_string()]),
            _ => Err(DnsLookupError {
                host: host.to_string(),
                record_type,
                message: "NXDOMAIN".to_string(),
            }),
        }
    }
}

/// IP intelligence stand-in returning one document (replaceable between calls)
pub struct StubIntel {
    name: &'static str,
    body: Mutex<Value>,
}

impl StubIntel {
    pub fn new(name: &'static str, body: Value) -> Self {
        Self {
            name,
            body: Mutex::new(body),
        }
    }

    pub fn set_body(&self, body: Value) {
        *self.body.lock().unwrap() = body;
    }
}

#[async_trait]
impl IpIntelligence for StubIntel {
    fn provider_name(&self) -> &'static str {
        self.name
    }

    async fn lookup(&self, _ip: IpAddr) -> Result<Value, ProviderError> {
        Ok(self.body.lock().unwrap().clone())
    }
}

pub fn paris_geo() -> Value {
    json!({
        "city": "Paris",
        "country": "FR",
        "connection": {"org": "ACME"},
        "success": true
    })
}

/// Service over an in-memory database and stub providers
pub struct TestHarness {
    pub pool: SqlitePool,
    pub service: Arc<EnrichmentService>,
    pub certificates: Arc<StubCertificates>,
    pub resolver: Arc<StubResolver>,
    pub geo: Arc<StubIntel>,
}

impl TestHarness {
    pub async fn new(certificates: StubCertificates, resolver: StubResolver) -> Self {
        let pool = domscope_common::db::init_memory_database()
            .await
            .expect("Failed to create in-memory database");

        let certificates = Arc::new(certificates);
        let resolver = Arc::new(resolver);
        let geo = Arc::new(StubIntel::new("ipwho.is", paris_geo()));
        let anycast = Arc::new(StubIntel::new("ipinfo.io", json!({"anycast": true})));

        let builder = RecordBuilder::new(
            resolver.clone(),
            DnsProbe::new(Arc::new(StubDns)),
            GeoEnricher::new(geo.clone(), anycast),
        );
        let collector = BatchCollector::new(Arc::new(builder), 4);
        let service = Arc::new(EnrichmentService::new(
            pool.clone(),
            certificates.clone(),
            collector,
        ));

        Self {
            pool,
            service,
            certificates,
            resolver,
            geo,
        }
    }

    pub fn router(&self) -> axum::Router {
        build_router(
            AppState::new(self.pool.clone(), self.service.clone()),
            &CorsConfig::default(),
        )
    }

    pub async fn stored_names(&self) -> Vec<String> {
        sqlx::query_scalar("SELECT domain_name FROM domain_info ORDER BY domain_name")
            .fetch_all(&self.pool)
            .await
            .unwrap()
    }
}
