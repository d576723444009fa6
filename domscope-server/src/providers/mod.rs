//! Upstream HTTP providers
//!
//! - crt.sh certificate transparency search (subdomain discovery)
//! - ipwho.is geolocation and network owner lookup
//! - ipinfo.io anycast flag lookup
//!
//! Each provider sits behind a trait so the enrichment core can be driven by
//! stubs in tests.

pub mod crt_sh;
pub mod http;
pub mod ip_info;
pub mod ip_who_is;

pub use crt_sh::{CertificateEntry, CrtShClient};
pub use http::JsonClient;
pub use ip_info::IpInfoClient;
pub use ip_who_is::IpWhoIsClient;

use async_trait::async_trait;
use serde_json::Value;
use std::net::IpAddr;
use thiserror::Error;

/// Provider client errors
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection, TLS or timeout failure
    #[error("{provider} request failed: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    /// Non-success HTTP status; `body` is the response body (JSON if it parsed)
    #[error("{provider} returned HTTP {status}")]
    Status {
        provider: &'static str,
        status: u16,
        body: Value,
    },

    /// Success status but the body was not the expected JSON
    #[error("{provider} returned an unreadable response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderError::Transport { provider, .. }
            | ProviderError::Status { provider, .. }
            | ProviderError::Decode { provider, .. } => provider,
        }
    }

    /// Raw diagnostic payload handed back to API callers
    pub fn payload(&self) -> Value {
        match self {
            ProviderError::Status { body, .. } => body.clone(),
            ProviderError::Transport { message, .. } | ProviderError::Decode { message, .. } => {
                Value::String(message.clone())
            }
        }
    }
}

/// Certificate transparency search
#[async_trait]
pub trait CertificateSource: Send + Sync {
    /// All certificate entries the log aggregator knows for `domain`
    async fn search(&self, domain: &str) -> Result<Vec<CertificateEntry>, ProviderError>;
}

/// IP intelligence API returning a loosely-typed JSON document per address
#[async_trait]
pub trait IpIntelligence: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn lookup(&self, ip: IpAddr) -> Result<Value, ProviderError>;
}
