//! Reconciliation: merge fresh derived entries with persisted state.
//!
//! The per-run state transition over a persisted list:
//!
//! 1. **Cleanup** — a derived entry survives only while its address is
//!    still in the current derived map; its provenance is refreshed from
//!    that map. Manual entries are never candidates for removal.
//! 2. **Merge** — derived entries are unioned in; an existing entry is
//!    overwritten only when the provenance actually differs, so an
//!    unchanged run is a no-op.
//! 3. **Whitelist-priority elimination** — anything present in the
//!    higher-priority list's reconciled address set is dropped.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use droplist_core::Provenance;

/// Counts from one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Derived entries whose domain no longer resolves to them.
    pub removed_stale: u64,
    /// Entries not previously persisted.
    pub added: u64,
    /// Entries whose provenance changed.
    pub updated: u64,
    /// Entries dropped because the whitelist claims the address.
    pub suppressed: u64,
}

/// Run the three-step reconciliation.
///
/// `priority_set` holds the addresses of the independently reconciled
/// higher-priority list; pass an empty set when reconciling that list
/// itself.
#[must_use]
pub fn reconcile(
    existing: &BTreeMap<String, Provenance>,
    derived: &BTreeMap<String, Provenance>,
    priority_set: &HashSet<String>,
) -> (BTreeMap<String, Provenance>, ReconcileOutcome) {
    let mut outcome = ReconcileOutcome::default();

    // Cleanup: prune stale derived entries, refresh surviving ones.
    let mut merged: BTreeMap<String, Provenance> = BTreeMap::new();
    for (entry, provenance) in existing {
        if provenance.is_derived() {
            if let Some(fresh) = derived.get(entry) {
                merged.insert(entry.clone(), fresh.clone());
            } else {
                outcome.removed_stale += 1;
                debug!(entry = %entry, %provenance, "removing stale derived entry");
            }
        } else {
            merged.insert(entry.clone(), provenance.clone());
        }
    }

    // Merge: union in the fresh derivations, overwriting only on change.
    for (entry, provenance) in derived {
        match merged.get(entry) {
            Some(current) if current == provenance => {}
            Some(_) => {
                outcome.updated += 1;
                merged.insert(entry.clone(), provenance.clone());
            }
            None => {
                outcome.added += 1;
                merged.insert(entry.clone(), provenance.clone());
            }
        }
    }

    // Whitelist priority: the higher list owns these addresses.
    if !priority_set.is_empty() {
        merged.retain(|entry, _| {
            let keep = !priority_set.contains(entry);
            if !keep {
                outcome.suppressed += 1;
                debug!(entry = %entry, "suppressing whitelisted entry");
            }
            keep
        });
    }

    info!(
        removed_stale = outcome.removed_stale,
        added = outcome.added,
        updated = outcome.updated,
        suppressed = outcome.suppressed,
        total = merged.len(),
        "reconciled persisted entries"
    );
    (merged, outcome)
}
