//! Domain-to-IP mapper: resolved addresses to provenance-tagged entries.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::net::Ipv4Addr;

use tracing::{debug, info, warn};

use droplist_core::bogon;
use droplist_core::{DomainRecord, Provenance};

use crate::protect::Protections;

/// Per-category counts of addresses discarded by protection filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    /// Addresses also backing trusted domains.
    pub shared: u64,
    /// Curated critical-infrastructure addresses.
    pub infrastructure: u64,
    /// Non-routable addresses.
    pub bogon: u64,
}

impl SkipCounts {
    /// Total discarded addresses.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.shared + self.infrastructure + self.bogon
    }
}

/// Map resolved addresses to provenance-tagged entries.
///
/// Protections apply in fixed order: shared-IP, then infrastructure, then
/// bogon; the first match discards the address and bumps that category's
/// counter. The bogon check always runs, even with empty veto sets. On
/// collision (several domains resolving to one address) the first record in
/// input order wins the attribution.
#[must_use]
pub fn derive_mappings(
    records: &[DomainRecord],
    resolved: &HashMap<String, BTreeSet<Ipv4Addr>>,
    protections: &Protections,
) -> (BTreeMap<String, Provenance>, SkipCounts) {
    let mut derived = BTreeMap::new();
    let mut skips = SkipCounts::default();

    for record in records {
        let Some(addresses) = resolved.get(&record.domain) else {
            continue;
        };

        for &ip in addresses {
            if protections.is_shared(ip) {
                skips.shared += 1;
                debug!(%ip, domain = %record.domain, "skipping shared address");
                continue;
            }
            if protections.is_infrastructure(ip) {
                skips.infrastructure += 1;
                warn!(%ip, domain = %record.domain, "skipping protected infrastructure address");
                continue;
            }
            if bogon::is_bogon_v4(ip) {
                skips.bogon += 1;
                debug!(%ip, domain = %record.domain, "skipping bogon address");
                continue;
            }

            derived
                .entry(ip.to_string())
                .or_insert_with(|| Provenance::derived(&record.domain, &record.source));
        }
    }

    info!(
        derived = derived.len(),
        skipped_shared = skips.shared,
        skipped_infrastructure = skips.infrastructure,
        skipped_bogon = skips.bogon,
        "mapped resolved addresses"
    );
    (derived, skips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ips(addrs: &[&str]) -> BTreeSet<Ipv4Addr> {
        addrs.iter().map(|a| a.parse().unwrap()).collect()
    }

    fn resolved_one(domain: &str, addrs: &[&str]) -> HashMap<String, BTreeSet<Ipv4Addr>> {
        HashMap::from([(domain.to_string(), ips(addrs))])
    }

    #[test]
    fn test_unprotected_address_gets_derived_provenance() {
        let records = vec![DomainRecord::new("evil.example.com", "SourceA")];
        let resolved = resolved_one("evil.example.com", &["203.0.113.10"]);

        let (derived, skips) = derive_mappings(&records, &resolved, &Protections::none());

        assert_eq!(skips, SkipCounts::default());
        assert_eq!(
            derived["203.0.113.10"].to_string(),
            "derived from domain evil.example.com (source SourceA)"
        );
    }

    #[test]
    fn test_protection_order_and_counts() {
        let records = vec![DomainRecord::new("evil.example.com", "SourceA")];
        let resolved = resolved_one(
            "evil.example.com",
            &["198.51.100.1", "192.0.2.53", "127.0.0.1", "203.0.113.10"],
        );

        let shared = HashSet::from(["198.51.100.1".parse().unwrap()]);
        let infrastructure = HashSet::from(["192.0.2.53".to_string()]);
        let protections = Protections::new(shared, infrastructure);

        let (derived, skips) = derive_mappings(&records, &resolved, &protections);

        assert_eq!(skips.shared, 1);
        assert_eq!(skips.infrastructure, 1);
        assert_eq!(skips.bogon, 1);
        assert_eq!(skips.total(), 3);
        assert_eq!(derived.len(), 1);
        assert!(derived.contains_key("203.0.113.10"));
    }

    #[test]
    fn test_shared_veto_wins_over_bogon_count() {
        // An address in both the shared set and a bogon range counts as a
        // shared skip: protections apply in fixed order.
        let records = vec![DomainRecord::new("evil.example.com", "SourceA")];
        let resolved = resolved_one("evil.example.com", &["10.1.2.3"]);
        let protections = Protections::new(HashSet::from(["10.1.2.3".parse().unwrap()]), HashSet::new());

        let (_, skips) = derive_mappings(&records, &resolved, &protections);
        assert_eq!(skips.shared, 1);
        assert_eq!(skips.bogon, 0);
    }

    #[test]
    fn test_bogon_filter_applies_without_veto_sets() {
        let records = vec![DomainRecord::new("sinkholed.example.com", "SourceA")];
        let resolved = resolved_one("sinkholed.example.com", &["0.0.0.0", "127.0.0.1"]);

        let (derived, skips) = derive_mappings(&records, &resolved, &Protections::none());
        assert!(derived.is_empty());
        assert_eq!(skips.bogon, 2);
    }

    #[test]
    fn test_collision_keeps_first_seen_attribution() {
        let records = vec![
            DomainRecord::new("first.example.com", "SourceA"),
            DomainRecord::new("second.example.com", "SourceB"),
        ];
        let mut resolved = resolved_one("first.example.com", &["203.0.113.10"]);
        resolved.insert("second.example.com".to_string(), ips(&["203.0.113.10"]));

        let (derived, _) = derive_mappings(&records, &resolved, &Protections::none());
        assert_eq!(
            derived["203.0.113.10"],
            Provenance::derived("first.example.com", "SourceA")
        );
    }

    #[test]
    fn test_unresolved_domains_are_ignored() {
        let records = vec![DomainRecord::new("gone.example.com", "SourceA")];
        let resolved = HashMap::new();

        let (derived, skips) = derive_mappings(&records, &resolved, &Protections::none());
        assert!(derived.is_empty());
        assert_eq!(skips.total(), 0);
    }
}
