//! ipwho.is client: city, country, network owner and lookup success flag

use super::{IpIntelligence, JsonClient, ProviderError};
use async_trait::async_trait;
use domscope_common::config::ProviderConfig;
use serde_json::Value;
use std::net::IpAddr;

pub const PROVIDER: &str = "ipwho.is";

pub struct IpWhoIsClient {
    client: JsonClient,
}

impl IpWhoIsClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: JsonClient::new(PROVIDER, config)?,
        })
    }
}

#[async_trait]
impl IpIntelligence for IpWhoIsClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn lookup(&self, ip: IpAddr) -> Result<Value, ProviderError> {
        self.client.get(&ip.to_string(), &[]).await
    }
}
