use thiserror::Error;

/// Errors from a single name resolution attempt.
///
/// These never escape the resolver's batch interface; they are absorbed
/// into the per-reason error histogram and the failing name yields an
/// empty address set.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The host resolver reported a lookup failure. Retried: transient
    /// failures and NXDOMAIN are indistinguishable at this boundary.
    #[error("dns error: {0}")]
    Lookup(String),

    /// The attempt exceeded the per-query timeout.
    #[error("lookup timed out")]
    Timeout,

    /// The name resolved, but to no IPv4 address.
    #[error("no IPv4 addresses")]
    NoAddress,

    /// The name is not something the resolver will even query.
    #[error("invalid name: {0}")]
    Invalid(String),
}

impl ResolveError {
    /// Whether a retry with backoff could plausibly succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Lookup(_) | Self::Timeout)
    }

    /// Coarse reason label for the error histogram.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Lookup(_) => "dns error",
            Self::Timeout => "timeout",
            Self::NoAddress => "no IPv4 addresses",
            Self::Invalid(_) => "invalid name",
        }
    }
}
