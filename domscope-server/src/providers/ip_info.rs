//! ipinfo.io client, consulted for the anycast flag

use super::{IpIntelligence, JsonClient, ProviderError};
use async_trait::async_trait;
use domscope_common::config::ProviderConfig;
use serde_json::Value;
use std::net::IpAddr;

pub const PROVIDER: &str = "ipinfo.io";

pub struct IpInfoClient {
    client: JsonClient,
}

impl IpInfoClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: JsonClient::new(PROVIDER, config)?,
        })
    }
}

#[async_trait]
impl IpIntelligence for IpInfoClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn lookup(&self, ip: IpAddr) -> Result<Value, ProviderError> {
        self.client.get(&ip.to_string(), &[]).await
    }
}
