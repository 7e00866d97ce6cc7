//! Group membership discovery through the platform resolver.

use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};
use tracing::debug;
use volsync_core::{GroupView, PeerAddress};

use crate::error::SupervisorError;
use crate::Result;

/// Source of group membership and of this node's own address.
#[async_trait]
pub trait GroupResolver: Send + Sync {
    /// All members currently registered under `group`, ordered and
    /// deduplicated. A name with no IPv4 members yields an empty view.
    async fn resolve(&self, group: &str) -> Result<GroupView>;

    /// This node's address as peers see it.
    ///
    /// Looked up separately because the group lookup may or may not list
    /// the local node depending on the platform.
    async fn self_address(&self) -> Result<PeerAddress>;
}

/// Resolver backed by the system's name service (`getaddrinfo`), which is
/// what container platforms use for service discovery.
#[derive(Debug, Default)]
pub struct DnsGroupResolver {
    _private: (),
}

impl DnsGroupResolver {
    /// Create a resolver using the system configuration
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Resolve a hostname to its IPv4 addresses, in resolver order
    async fn lookup_v4(&self, name: &str) -> Result<Vec<Ipv4Addr>> {
        use tokio::net::lookup_host;

        let query = absolute(name);

        // Use port 0 for lookup
        let addrs = lookup_host(format!("{query}:0"))
            .await
            .map_err(|e| SupervisorError::resolution(&query, e))?;

        let ips: Vec<Ipv4Addr> = addrs
            .filter_map(|a| match a.ip() {
                IpAddr::V4(ip) => Some(ip),
                IpAddr::V6(_) => None,
            })
            .collect();

        debug!(name = %query, addresses = ?ips, "resolved");
        Ok(ips)
    }
}

#[async_trait]
impl GroupResolver for DnsGroupResolver {
    async fn resolve(&self, group: &str) -> Result<GroupView> {
        let ips = self.lookup_v4(group).await?;
        Ok(GroupView::from_addresses(ips))
    }

    async fn self_address(&self) -> Result<PeerAddress> {
        let host = hostname::get()
            .map_err(|e| SupervisorError::resolution("local hostname", e))?
            .to_string_lossy()
            .into_owned();

        self.lookup_v4(&host)
            .await?
            .first()
            .copied()
            .map(PeerAddress::from)
            .ok_or_else(|| SupervisorError::resolution(&host, "no IPv4 address"))
    }
}

/// Append the root label so resolver search domains are not applied.
/// Address literals are passed through untouched.
fn absolute(name: &str) -> String {
    if name.ends_with('.') || name.parse::<IpAddr>().is_ok() {
        name.to_string()
    } else {
        format!("{name}.")
    }
}
