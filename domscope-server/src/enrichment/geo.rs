//! Geolocation enrichment from two IP-intelligence providers
//!
//! The primary provider (ipwho.is) supplies city, country, network owner and
//! the success flag. The anycast provider (ipinfo.io) supplies only the
//! anycast flag. Missing or mistyped fields fall back to defaults; a failed
//! call is returned to the caller unchanged.

use crate::providers::{IpIntelligence, ProviderError};
use serde::Serialize;
use serde_json::Value;
use std::net::IpAddr;
use std::sync::Arc;

/// Merged provider facts for one address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeoFacts {
    pub geo_city: String,
    pub geo_country: String,
    pub network_owner_name: String,
    pub is_active: bool,
    pub is_anycast_node: bool,
}

impl GeoFacts {
    /// Apply the field mapping to the two provider documents
    pub fn from_provider_fields(primary: &Value, anycast: &Value) -> Self {
        let text = |value: Option<&Value>| {
            value
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default()
        };

        Self {
            geo_city: text(primary.get("city")),
            geo_country: text(primary.get("country")),
            network_owner_name: text(primary.get("connection").and_then(|c| c.get("org"))),
            is_active: primary
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            is_anycast_node: anycast
                .get("anycast")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

#[derive(Clone)]
pub struct GeoEnricher {
    primary: Arc<dyn IpIntelligence>,
    anycast: Arc<dyn IpIntelligence>,
}

impl GeoEnricher {
    pub fn new(primary: Arc<dyn IpIntelligence>, anycast: Arc<dyn IpIntelligence>) -> Self {
        Self { primary, anycast }
    }

    /// Query both providers concurrently and merge their answers
    pub async fn enrich(&self, ip: IpAddr) -> Result<GeoFacts, ProviderError> {
        let (primary, anycast) =
            tokio::try_join!(self.primary.lookup(ip), self.anycast.lookup(ip))?;

        let facts = GeoFacts::from_provider_fields(&primary, &anycast);

        tracing::debug!(
            ip = %ip,
            primary = self.primary.provider_name(),
            anycast_provider = self.anycast.provider_name(),
            city = %facts.geo_city,
            country = %facts.geo_country,
            "Merged geolocation facts"
        );

        Ok(facts)
    }
}
