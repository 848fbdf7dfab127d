//! Protection filtering, mapping and reconciliation for droplist.
//!
//! This crate turns resolved address sets into persisted list updates:
//!
//! - **Protections**: shared-IP and infrastructure veto sets, recomputed
//!   every run
//! - **Mapper**: attaches provenance to derived addresses, applying the
//!   protections in fixed order (shared, infrastructure, bogon)
//! - **Reconciliation**: prunes stale derived entries, merges fresh ones,
//!   keeps manual entries untouched and enforces whitelist priority
//! - **Pipeline**: the whitelist and blacklist passes wired end to end

mod error;
pub mod mapper;
pub mod pipeline;
pub mod protect;
pub mod reconcile;

pub use error::{EngineError, Result};
pub use mapper::SkipCounts;
pub use pipeline::{ListPaths, PassReport};
pub use protect::Protections;
pub use reconcile::ReconcileOutcome;
