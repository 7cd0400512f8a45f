//! Harvester host name resolution

use async_trait::async_trait;
use std::io;
use std::net::IpAddr;
use tokio::net::lookup_host;

#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolve a host name (never a literal IP) to one address
    async fn resolve(&self, host: &str) -> io::Result<IpAddr>;
}

/// System resolver; prefers an IPv4 answer when both families resolve
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

#[async_trait]
impl HostResolver for DnsResolver {
    async fn resolve(&self, host: &str) -> io::Result<IpAddr> {
        let addresses: Vec<IpAddr> = lookup_host((host, 0))
            .await?
            .map(|addr| addr.ip().to_canonical())
            .collect();

        addresses
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addresses.first())
            .copied()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no address for {}", host))
            })
    }
}

/// Parse a literal IP, folding IPv4-mapped IPv6 back to IPv4
pub fn literal_ip(host: &str) -> Option<IpAddr> {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .ok()
        .map(|ip| ip.to_canonical())
}
