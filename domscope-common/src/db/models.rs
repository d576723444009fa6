//! Database models

use crate::{DomainType, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::BTreeMap;
use uuid::Uuid;

/// DNS record type name ("A", "MX", ...) to the answers for that type, in
/// resolver order. Types without answers are absent, never empty.
pub type DnsSettings = BTreeMap<String, Vec<String>>;

/// Column list shared by every `SELECT` of a full row
pub const DOMAIN_INFO_COLUMNS: &str = "id, domain_name, domain_type, ip_address, geo_city, \
     geo_country, network_owner_name, is_active, is_anycast_node, dns_settings, \
     created_at, updated_at";

/// Persisted enrichment result for one host name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub id: Uuid,
    pub domain_name: String,
    pub domain_type: DomainType,
    pub ip_address: Option<String>,
    pub geo_city: String,
    pub geo_country: String,
    pub network_owner_name: String,
    pub is_active: bool,
    pub is_anycast_node: bool,
    pub dns_settings: DnsSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainRecord {
    /// Decode a row selected with [`DOMAIN_INFO_COLUMNS`]
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let id: String = row.try_get("id")?;
        let domain_type: String = row.try_get("domain_type")?;
        let dns_settings: String = row.try_get("dns_settings")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self {
            id: Uuid::parse_str(&id)
                .map_err(|e| Error::Internal(format!("Invalid id '{}': {}", id, e)))?,
            domain_name: row.try_get("domain_name")?,
            domain_type: domain_type.parse()?,
            ip_address: row.try_get("ip_address")?,
            geo_city: row.try_get("geo_city")?,
            geo_country: row.try_get("geo_country")?,
            network_owner_name: row.try_get("network_owner_name")?,
            is_active: row.try_get("is_active")?,
            is_anycast_node: row.try_get("is_anycast_node")?,
            dns_settings: serde_json::from_str(&dns_settings).map_err(|e| {
                Error::Internal(format!("Failed to deserialize dns_settings: {}", e))
            })?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse timestamp '{}': {}", value, e)))
}
