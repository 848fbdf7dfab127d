//! The lookup seam between the resolver and the host's DNS machinery.

use std::collections::BTreeSet;
use std::net::{Ipv4Addr, SocketAddr};

use async_trait::async_trait;

use crate::error::ResolveError;

/// A single-name address lookup.
///
/// The resolver drives everything above this trait (caching, retries,
/// timeouts, concurrency, statistics); implementations only answer one
/// question: which IPv4 addresses does this name have right now?
#[async_trait]
pub trait Lookup: Send + Sync {
    /// Resolve a name to its IPv4 addresses.
    ///
    /// IPv6 answers are dropped at this boundary: the persisted lists feed
    /// IPv4 firewall rules, so AAAA records are out of scope here.
    async fn lookup_ipv4(&self, name: &str) -> Result<BTreeSet<Ipv4Addr>, ResolveError>;
}

/// Lookup via the operating system resolver (A-record queries only, no
/// recursive DNS of our own).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

#[async_trait]
impl Lookup for SystemLookup {
    async fn lookup_ipv4(&self, name: &str) -> Result<BTreeSet<Ipv4Addr>, ResolveError> {
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(ResolveError::Invalid(name.to_string()));
        }

        let addrs = tokio::net::lookup_host((name, 0u16))
            .await
            .map_err(|e| ResolveError::Lookup(e.to_string()))?;

        Ok(addrs
            .filter_map(|addr| match addr {
                SocketAddr::V4(v4) => Some(*v4.ip()),
                SocketAddr::V6(_) => None,
            })
            .collect())
    }
}
