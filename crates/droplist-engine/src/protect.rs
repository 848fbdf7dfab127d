//! Protection sets: addresses the mapper must never blacklist.
//!
//! Two veto classes are derived fresh every run. Shared-IP protection
//! resolves the trusted (whitelist) domains and collects every address they
//! sit on, because shared-hosting and CDN addresses drift and yesterday's
//! snapshot would protect the wrong hosts. Infrastructure protection is the
//! curated whitelist-specific entry set (recursive/authoritative name
//! servers and similar), an unconditional veto regardless of what resolved
//! to it.

use std::collections::{BTreeMap, HashSet};
use std::net::Ipv4Addr;

use tracing::info;

use droplist_core::{DomainRecord, Provenance};
use droplist_resolver::Resolver;

/// The veto sets applied by the mapper.
///
/// Both sets may be empty, in which case they degrade to no-op filters.
#[derive(Debug, Clone, Default)]
pub struct Protections {
    shared: HashSet<Ipv4Addr>,
    infrastructure: HashSet<String>,
}

impl Protections {
    /// No protection at all (used by the whitelist pipeline, which has no
    /// list above it).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Build from a shared-IP set and an infrastructure entry set.
    #[must_use]
    pub fn new(shared: HashSet<Ipv4Addr>, infrastructure: HashSet<String>) -> Self {
        Self {
            shared,
            infrastructure,
        }
    }

    /// Whether the address also backs a trusted domain.
    #[must_use]
    pub fn is_shared(&self, ip: Ipv4Addr) -> bool {
        self.shared.contains(&ip)
    }

    /// Whether the address is curated critical infrastructure.
    ///
    /// Membership is textual: the curated set may hold entries that are not
    /// plain addresses, and an address protects itself only by exact match.
    #[must_use]
    pub fn is_infrastructure(&self, ip: Ipv4Addr) -> bool {
        self.infrastructure.contains(&ip.to_string())
    }

    /// Size of the shared-IP set, for run summaries.
    #[must_use]
    pub fn shared_len(&self) -> usize {
        self.shared.len()
    }

    /// Size of the infrastructure set, for run summaries.
    #[must_use]
    pub fn infrastructure_len(&self) -> usize {
        self.infrastructure.len()
    }
}

/// Resolve the trusted domains and return the union of their addresses.
pub async fn shared_whitelist_ips(
    resolver: &Resolver,
    records: &[DomainRecord],
) -> HashSet<Ipv4Addr> {
    if records.is_empty() {
        return HashSet::new();
    }

    let names: Vec<String> = records.iter().map(|r| r.domain.clone()).collect();
    let resolved = resolver.resolve_all(&names).await;

    let shared: HashSet<Ipv4Addr> = resolved.values().flatten().copied().collect();
    info!(
        domains = records.len(),
        addresses = shared.len(),
        "derived shared-IP protection set"
    );
    shared
}

/// Extract the infrastructure veto set from a persisted entry map.
#[must_use]
pub fn infrastructure_set(entries: &BTreeMap<String, Provenance>) -> HashSet<String> {
    entries.keys().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_protections_are_no_ops() {
        let p = Protections::none();
        let ip: Ipv4Addr = "203.0.113.10".parse().unwrap();
        assert!(!p.is_shared(ip));
        assert!(!p.is_infrastructure(ip));
    }

    #[test]
    fn test_infrastructure_membership_is_exact_text() {
        let mut entries = BTreeMap::new();
        entries.insert("192.0.2.53".to_string(), Provenance::Manual("root DNS".into()));
        entries.insert("192.0.2.0/24".to_string(), Provenance::Manual("range".into()));

        let p = Protections::new(HashSet::new(), infrastructure_set(&entries));
        assert!(p.is_infrastructure("192.0.2.53".parse().unwrap()));
        // Addresses inside a curated CIDR are not expanded.
        assert!(!p.is_infrastructure("192.0.2.7".parse().unwrap()));
        assert_eq!(p.infrastructure_len(), 2);
    }
}
