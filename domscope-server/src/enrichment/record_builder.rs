//! Build one pending `domain_info` row from a host name

use super::{classify, DnsProbe, EnrichError, GeoEnricher, HostResolver};
use domscope_common::db::DnsSettings;
use domscope_common::DomainType;
use std::sync::Arc;

/// Enriched row not yet persisted (no id, no timestamps)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRecord {
    pub domain_name: String,
    pub domain_type: DomainType,
    pub ip_address: Option<String>,
    pub geo_city: String,
    pub geo_country: String,
    pub network_owner_name: String,
    pub is_active: bool,
    pub is_anycast_node: bool,
    pub dns_settings: DnsSettings,
}

#[derive(Clone)]
pub struct RecordBuilder {
    resolver: Arc<dyn HostResolver>,
    dns: DnsProbe,
    geo: GeoEnricher,
}

impl RecordBuilder {
    pub fn new(resolver: Arc<dyn HostResolver>, dns: DnsProbe, geo: GeoEnricher) -> Self {
        Self { resolver, dns, geo }
    }

    /// Resolve `host`, then gather geolocation, DNS records and the
    /// classification concurrently
    ///
    /// Fails when the name does not resolve or a geolocation provider fails.
    /// DNS record failures only thin out `dns_settings`.
    pub async fn build(&self, host: &str) -> Result<PendingRecord, EnrichError> {
        let ip = self.resolver.resolve(host).await?;

        let classify_host = host.to_string();
        let (geo, dns_settings, domain_type) = tokio::try_join!(
            async { self.geo.enrich(ip).await.map_err(EnrichError::from) },
            async { Ok::<_, EnrichError>(self.dns.probe(host).await) },
            async move {
                // Suffix list matching is CPU-bound
                tokio::task::spawn_blocking(move || classify(&classify_host))
                    .await
                    .map_err(|e| EnrichError::Worker(e.to_string()))
            },
        )?;

        tracing::debug!(
            host = %host,
            ip = %ip,
            domain_type = %domain_type,
            dns_types = dns_settings.len(),
            "Built domain record"
        );

        Ok(PendingRecord {
            domain_name: host.to_string(),
            domain_type,
            ip_address: Some(ip.to_string()),
            geo_city: geo.geo_city,
            geo_country: geo.geo_country,
            network_owner_name: geo.network_owner_name,
            is_active: geo.is_active,
            is_anycast_node: geo.is_anycast_node,
            dns_settings,
        })
    }
}
