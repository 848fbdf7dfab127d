//! The whitelist and blacklist passes wired end to end.
//!
//! The whitelist pass runs first and reconciles the whitelist-specific
//! list with no protection above it. The blacklist pass then loads that
//! freshly written list twice over: its entries are the infrastructure
//! veto during mapping and the priority set during reconciliation, so
//! nothing the whitelist claims can survive into the blacklist output.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use droplist_core::listfile;
use droplist_resolver::Resolver;

use crate::mapper::{self, SkipCounts};
use crate::protect::{self, Protections};
use crate::reconcile::{self, ReconcileOutcome};
use crate::Result;

/// Output header title for the whitelist-specific list.
const WHITELIST_TITLE: &str = "Whitelist IP entries - addresses resolved from whitelist domains";

/// Output header title for the blacklist-specific list.
const BLACKLIST_TITLE: &str = "Blacklist IP entries - addresses resolved from blacklist domains";

/// Locations of the four flat files a run touches.
#[derive(Debug, Clone)]
pub struct ListPaths {
    /// Trusted domain list (`domain # source`).
    pub whitelist_domains: PathBuf,
    /// Blacklisted domain list (`domain # source`).
    pub blacklist_domains: PathBuf,
    /// Persisted whitelist-specific IP list; also the infrastructure set.
    pub whitelist_specific: PathBuf,
    /// Persisted blacklist-specific IP list.
    pub blacklist_specific: PathBuf,
}

impl ListPaths {
    /// Conventional file names under a data directory.
    #[must_use]
    pub fn under(dir: &Path) -> Self {
        Self {
            whitelist_domains: dir.join("whitelist.txt"),
            blacklist_domains: dir.join("blacklist.txt"),
            whitelist_specific: dir.join("whitelist-specific.txt"),
            blacklist_specific: dir.join("blacklist-specific.txt"),
        }
    }
}

impl Default for ListPaths {
    fn default() -> Self {
        Self::under(Path::new("data"))
    }
}

/// Summary of one pipeline pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassReport {
    /// Domains read from the source list (wildcards excluded).
    pub domains: usize,
    /// Domains that resolved to at least one address.
    pub resolved: usize,
    /// Derived entries after protection filtering.
    pub derived: usize,
    /// Protection skip counts.
    pub skips: SkipCounts,
    /// Reconciliation counts.
    pub outcome: ReconcileOutcome,
    /// Entries in the written output.
    pub total: usize,
}

/// Resolve the whitelist domains and reconcile the whitelist-specific list.
///
/// A missing or empty domain source list aborts the pass without touching
/// the persisted file: an unreadable source must never be mistaken for
/// "every domain was delisted" and wipe the derived entries.
pub async fn run_whitelist_pass(resolver: &Resolver, paths: &ListPaths) -> Result<PassReport> {
    info!("starting whitelist pass");

    let records = listfile::read_domains(&paths.whitelist_domains);
    if records.is_empty() {
        warn!(
            path = %paths.whitelist_domains.display(),
            "no whitelist domains to resolve, leaving persisted list untouched"
        );
        return Ok(PassReport::default());
    }
    let existing = listfile::read_entries(&paths.whitelist_specific);

    let names: Vec<String> = records.iter().map(|r| r.domain.clone()).collect();
    let resolved = resolver.resolve_all(&names).await;

    let (derived, skips) = mapper::derive_mappings(&records, &resolved, &Protections::none());
    let (merged, outcome) = reconcile::reconcile(&existing, &derived, &HashSet::new());

    listfile::write_entries(&paths.whitelist_specific, WHITELIST_TITLE, &merged)?;

    Ok(PassReport {
        domains: records.len(),
        resolved: resolved.len(),
        derived: derived.len(),
        skips,
        outcome,
        total: merged.len(),
    })
}

/// Resolve the blacklist domains under full protection and reconcile the
/// blacklist-specific list.
///
/// As with the whitelist pass, a missing or empty domain source list
/// aborts before reconciliation so persisted derived entries survive a
/// transiently unreadable source.
pub async fn run_blacklist_pass(resolver: &Resolver, paths: &ListPaths) -> Result<PassReport> {
    info!("starting blacklist pass");

    let records = listfile::read_domains(&paths.blacklist_domains);
    if records.is_empty() {
        warn!(
            path = %paths.blacklist_domains.display(),
            "no blacklist domains to resolve, leaving persisted list untouched"
        );
        return Ok(PassReport::default());
    }

    // The whitelist-specific list doubles as infrastructure veto (during
    // mapping) and priority set (during reconciliation).
    let protected = listfile::read_entries(&paths.whitelist_specific);
    let priority_set = protect::infrastructure_set(&protected);

    let trusted = listfile::read_domains(&paths.whitelist_domains);
    let shared = protect::shared_whitelist_ips(resolver, &trusted).await;
    let protections = Protections::new(shared, priority_set.clone());

    let existing = listfile::read_entries(&paths.blacklist_specific);

    let names: Vec<String> = records.iter().map(|r| r.domain.clone()).collect();
    let resolved = resolver.resolve_all(&names).await;

    let (derived, skips) = mapper::derive_mappings(&records, &resolved, &protections);
    let (merged, outcome) = reconcile::reconcile(&existing, &derived, &priority_set);

    listfile::write_entries(&paths.blacklist_specific, BLACKLIST_TITLE, &merged)?;

    Ok(PassReport {
        domains: records.len(),
        resolved: resolved.len(),
        derived: derived.len(),
        skips,
        outcome,
        total: merged.len(),
    })
}

/// Run the whitelist pass, then the blacklist pass, sharing the resolver
/// (and therefore its cache) between them.
pub async fn run_all(
    resolver: &Resolver,
    paths: &ListPaths,
) -> Result<(PassReport, PassReport)> {
    let whitelist = run_whitelist_pass(resolver, paths).await?;
    let blacklist = run_blacklist_pass(resolver, paths).await?;
    Ok((whitelist, blacklist))
}
