//! Entry provenance: the recorded justification for a persisted entry.
//!
//! Provenance is the sole signal that governs pruning. Entries derived from
//! a domain resolution carry the domain and source they came from and are
//! refreshed or removed automatically on every run. Everything else is
//! treated as manual and is never removed programmatically — including
//! legacy annotations this code does not recognize.

use std::fmt;

/// Text marker that opens a machine-derived provenance annotation.
const DERIVED_PREFIX: &str = "derived from domain ";

/// Separator between the domain and its source in a derived annotation.
const SOURCE_OPEN: &str = " (source ";

/// A domain to resolve, paired with the feed it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    /// Fully qualified domain name, lowercased.
    pub domain: String,
    /// Human-readable source feed name.
    pub source: String,
}

impl DomainRecord {
    /// Create a record, normalizing the domain to lowercase.
    pub fn new(domain: impl AsRef<str>, source: impl Into<String>) -> Self {
        Self {
            domain: domain.as_ref().trim().to_lowercase(),
            source: source.into(),
        }
    }
}

/// Why an entry is present in a persisted list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Machine-derived: the entry came from resolving `domain` (fed by
    /// `source`). Eligible for automatic refresh and pruning.
    Derived {
        /// Domain that resolved to this address.
        domain: String,
        /// Source feed the domain was listed by.
        source: String,
    },
    /// Manually curated or unrecognized legacy annotation. Never pruned.
    Manual(String),
}

impl Provenance {
    /// Shorthand constructor for a derived annotation.
    pub fn derived(domain: impl Into<String>, source: impl Into<String>) -> Self {
        Self::Derived {
            domain: domain.into(),
            source: source.into(),
        }
    }

    /// Whether this entry was machine-derived and may be pruned.
    #[must_use]
    pub const fn is_derived(&self) -> bool {
        matches!(self, Self::Derived { .. })
    }

    /// Parse a provenance annotation from its persisted text form.
    ///
    /// Anything that does not match the derived marker exactly is kept as
    /// [`Provenance::Manual`], so malformed or legacy annotations fail safe
    /// into the non-prunable class.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(rest) = text.strip_prefix(DERIVED_PREFIX) {
            if let Some((domain, tail)) = rest.split_once(SOURCE_OPEN) {
                if let Some(source) = tail.strip_suffix(')') {
                    if !domain.is_empty() && !source.contains(')') {
                        return Self::Derived {
                            domain: domain.to_string(),
                            source: source.to_string(),
                        };
                    }
                }
            }
        }
        Self::Manual(text.to_string())
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Derived { domain, source } => {
                write!(f, "{DERIVED_PREFIX}{domain}{SOURCE_OPEN}{source})")
            }
            Self::Manual(text) => f.write_str(text),
        }
    }
}
