//! Concurrent, caching name resolution for droplist.
//!
//! The resolver turns batches of thousands of domains into IPv4 address
//! sets without ever letting an individual failure abort the batch. Each
//! [`Resolver`] owns its own cache and statistics, so independent instances
//! never share state across runs or tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use droplist_resolver::{Resolver, ResolverConfig};
//!
//! let resolver = Resolver::new(ResolverConfig::default());
//! let results = resolver.resolve_all(&domains).await;
//! let stats = resolver.stats();
//! ```

mod config;
mod error;
mod lookup;
mod resolver;

pub use config::{ResolverConfig, RetryPolicy};
pub use error::ResolveError;
pub use lookup::{Lookup, SystemLookup};
pub use resolver::{ResolveStats, Resolver};
