//! Deterministic ordering for output entries.
//!
//! Persisted lists are consumed as diffs by downstream tooling, so output
//! order must be stable across runs and independent of insertion order.
//! Entries sort by address family (IPv4 first), then by numeric address
//! value, then by prefix length. Entries that are neither an address nor a
//! CIDR sort last, lexicographically.

use std::cmp::Ordering;
use std::net::IpAddr;

/// Comparable sort key for an `ip_or_cidr` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    family: u8,
    addr: u128,
    prefix: u8,
    raw: String,
}

impl SortKey {
    /// Build the key for an entry string.
    ///
    /// Accepts bare addresses (`9.255.255.255`, `2001:4860::1`) and CIDR
    /// notation (`10.0.0.0/24`, `2001:4860::/32`). A bare address gets the
    /// full host prefix so it sorts immediately after an identical network
    /// base with a shorter prefix.
    #[must_use]
    pub fn new(entry: &str) -> Self {
        let entry = entry.trim();
        let (addr_part, prefix_part) = match entry.split_once('/') {
            Some((a, p)) => (a, Some(p)),
            None => (entry, None),
        };

        if let Ok(ip) = addr_part.parse::<IpAddr>() {
            let (family, addr, host_prefix) = match ip {
                IpAddr::V4(v4) => (0, u128::from(u32::from(v4)), 32),
                IpAddr::V6(v6) => (1, u128::from(v6), 128),
            };
            let prefix = prefix_part
                .and_then(|p| p.parse::<u8>().ok())
                .filter(|p| *p <= host_prefix)
                .unwrap_or(host_prefix);
            return Self {
                family,
                addr,
                prefix,
                raw: entry.to_string(),
            };
        }

        // Unrecognized entries keep their text order after all addresses.
        Self {
            family: 2,
            addr: 0,
            prefix: 0,
            raw: entry.to_string(),
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.family, self.addr, self.prefix, &self.raw).cmp(&(
            other.family,
            other.addr,
            other.prefix,
            &other.raw,
        ))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort entry strings in place using [`SortKey`].
pub fn sort_entries(entries: &mut [String]) {
    entries.sort_by_cached_key(|e| SortKey::new(e));
}
