//! Core types and list-file handling for droplist.
//!
//! This crate provides the foundational pieces shared by the resolver and
//! the reconciliation engine:
//!
//! - **Provenance**: tagged origin of a persisted entry (derived vs manual)
//! - **List files**: the line-oriented `entry # annotation` flat-file format
//! - **Ordering**: the deterministic sort applied to every output file
//! - **Bogon classification**: non-routable address detection
//!
//! # Example
//!
//! ```rust,ignore
//! use droplist_core::{Provenance, bogon};
//!
//! assert!(bogon::is_bogon("127.0.0.1"));
//! let p = Provenance::derived("evil.example.com", "SourceA");
//! assert!(p.is_derived());
//! ```

pub mod bogon;
mod error;
pub mod listfile;
pub mod order;
pub mod provenance;

pub use error::{CoreError, Result};
pub use provenance::{DomainRecord, Provenance};
