//! Forward name resolution (host name to IP address)

use super::EnrichError;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, ToSocketAddrs};

#[async_trait]
pub trait HostResolver: Send + Sync {
    /// One address for `host`; `EnrichError::Resolution` when there is none
    async fn resolve(&self, host: &str) -> Result<IpAddr, EnrichError>;
}

/// Resolver backed by the operating system (`getaddrinfo`)
///
/// The libc call blocks, so it runs on tokio's blocking pool. IPv4 answers
/// are preferred, matching what `gethostbyname` would return.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str) -> Result<IpAddr, EnrichError> {
        let owned_host = host.to_string();

        let addrs = tokio::task::spawn_blocking(move || {
            (owned_host.as_str(), 0u16)
                .to_socket_addrs()
                .map(|iter| iter.map(|addr| addr.ip()).collect::<Vec<_>>())
        })
        .await
        .map_err(|e| EnrichError::Worker(e.to_string()))?
        .map_err(|source| EnrichError::Resolution {
            host: host.to_string(),
            source,
        })?;

        pick_address(&addrs).ok_or_else(|| EnrichError::Resolution {
            host: host.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no addresses returned"),
        })
    }
}

fn pick_address(addrs: &[IpAddr]) -> Option<IpAddr> {
    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
}
