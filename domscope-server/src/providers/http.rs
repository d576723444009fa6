//! Shared JSON-over-HTTP GET client used by every provider

use super::ProviderError;
use domscope_common::config::ProviderConfig;
use serde_json::Value;

const USER_AGENT: &str = concat!("domscope/", env!("CARGO_PKG_VERSION"));

/// GET-only JSON client bound to one provider base URL
#[derive(Debug, Clone)]
pub struct JsonClient {
    provider: &'static str,
    base_url: String,
    http_client: reqwest::Client,
}

impl JsonClient {
    pub fn new(provider: &'static str, config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()
            .map_err(|e| ProviderError::Transport {
                provider,
                message: e.to_string(),
            })?;

        Ok(Self {
            provider,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    /// GET `{base_url}/{path}` (or the bare base URL when `path` is empty)
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ProviderError> {
        let url = if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path)
        };

        tracing::debug!(provider = self.provider, url = %url, "Querying provider");

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                provider: self.provider,
                message: e.to_string(),
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str(&error_text).unwrap_or(Value::String(error_text));
            return Err(ProviderError::Status {
                provider: self.provider,
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(|e| ProviderError::Decode {
            provider: self.provider,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_trims_base_url() {
        let config = ProviderConfig {
            base_url: "https://ipinfo.io/".to_string(),
            timeout_secs: 5,
        };
        let client = JsonClient::new("ipinfo.io", &config).unwrap();
        assert_eq!(client.base_url, "https://ipinfo.io");
        assert_eq!(client.provider(), "ipinfo.io");
    }
}
