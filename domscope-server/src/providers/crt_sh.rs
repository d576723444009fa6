//! crt.sh certificate transparency search client

use super::{CertificateSource, JsonClient, ProviderError};
use async_trait::async_trait;
use domscope_common::config::ProviderConfig;
use serde::Deserialize;

pub const PROVIDER: &str = "crt.sh";

/// One certificate from the crt.sh JSON output
///
/// `name_value` holds every subject alternative name on the certificate,
/// one per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CertificateEntry {
    #[serde(default)]
    pub name_value: String,
}

impl CertificateEntry {
    pub fn new(name_value: impl Into<String>) -> Self {
        Self {
            name_value: name_value.into(),
        }
    }
}

/// crt.sh API client
pub struct CrtShClient {
    client: JsonClient,
}

impl CrtShClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: JsonClient::new(PROVIDER, config)?,
        })
    }
}

#[async_trait]
impl CertificateSource for CrtShClient {
    async fn search(&self, domain: &str) -> Result<Vec<CertificateEntry>, ProviderError> {
        let value = self
            .client
            .get("", &[("q", domain), ("output", "json")])
            .await?;

        let entries: Vec<CertificateEntry> =
            serde_json::from_value(value).map_err(|e| ProviderError::Decode {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        tracing::info!(
            domain = %domain,
            certificates = entries.len(),
            "Retrieved certificate entries from crt.sh"
        );

        Ok(entries)
    }
}
