//! The resolver core: bounded concurrency, caching, retry with backoff.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::lookup::{Lookup, SystemLookup};

/// Post-run resolution totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Names handed to the resolver (after per-call deduplication).
    pub attempted: u64,
    /// Names that produced at least one IPv4 address from a fresh query.
    pub resolved: u64,
    /// Names served from the in-process cache.
    pub cached: u64,
    /// Names that produced nothing after exhausting retries.
    pub failed: u64,
    /// Failure count per coarse reason.
    pub errors: HashMap<String, u64>,
}

impl ResolveStats {
    /// The `n` most frequent failure reasons, most frequent first.
    #[must_use]
    pub fn top_errors(&self, n: usize) -> Vec<(String, u64)> {
        let mut ranked: Vec<(String, u64)> =
            self.errors.iter().map(|(k, v)| (k.clone(), *v)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }
}

/// Concurrent caching resolver.
///
/// Owns its cache and counters outright; create one per pipeline run (or
/// share one across the whitelist and blacklist passes so the second pass
/// reuses the first's answers). Lock scopes are O(1) map operations only —
/// no lookup ever runs under a lock.
pub struct Resolver {
    lookup: Arc<dyn Lookup>,
    config: ResolverConfig,
    cache: Mutex<HashMap<String, BTreeSet<Ipv4Addr>>>,
    stats: Mutex<ResolveStats>,
}

impl Resolver {
    /// Create a resolver backed by the operating system resolver.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_lookup(config, Arc::new(SystemLookup))
    }

    /// Create a resolver with a custom lookup backend.
    #[must_use]
    pub fn with_lookup(config: ResolverConfig, lookup: Arc<dyn Lookup>) -> Self {
        Self {
            lookup,
            config,
            cache: Mutex::new(HashMap::new()),
            stats: Mutex::new(ResolveStats::default()),
        }
    }

    /// Resolve a batch of names, returning `name -> IPv4 set` for every
    /// name that produced at least one address.
    ///
    /// Individual failures never propagate: they are absorbed into the
    /// statistics and the name is simply absent from the result. Duplicate
    /// input names are resolved once. Completion order is unspecified; the
    /// call returns once every name has finished or exhausted its retries.
    pub async fn resolve_all(&self, names: &[String]) -> HashMap<String, BTreeSet<Ipv4Addr>> {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = names
            .iter()
            .map(String::as_str)
            .filter(|name| seen.insert(*name))
            .collect();

        let total = unique.len();
        self.stats_mut().attempted += u64::try_from(total).unwrap_or(u64::MAX);

        info!(
            domains = total,
            width = self.config.max_concurrency,
            timeout = ?self.config.attempt_timeout,
            "starting name resolution"
        );

        // Progress roughly every 5%, but never spam small batches.
        let progress_interval = (total / 20).max(100);

        let mut results = HashMap::with_capacity(total);
        let mut completed = 0usize;

        let mut lookups = stream::iter(
            unique
                .into_iter()
                .map(|name| async move { (name, self.resolve_one(name).await) }),
        )
        .buffer_unordered(self.config.max_concurrency.max(1));

        while let Some((name, ips)) = lookups.next().await {
            completed += 1;
            if completed % progress_interval == 0 {
                info!(completed, total, "resolution progress");
            }
            if !ips.is_empty() {
                results.insert(name.to_string(), ips);
            }
        }

        info!(
            total,
            resolved = results.len(),
            "name resolution finished"
        );
        results
    }

    /// Snapshot of the accumulated statistics.
    #[must_use]
    pub fn stats(&self) -> ResolveStats {
        self.stats_mut().clone()
    }

    /// Resolve one name through cache, timeout and retry policy.
    async fn resolve_one(&self, name: &str) -> BTreeSet<Ipv4Addr> {
        if let Some(hit) = self.cache_get(name) {
            self.stats_mut().cached += 1;
            return hit;
        }

        let mut last_error = None;
        for attempt in 0..=self.config.retry.max_retries {
            let outcome = match tokio::time::timeout(
                self.config.attempt_timeout,
                self.lookup.lookup_ipv4(name),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(ResolveError::Timeout),
            };

            match outcome {
                Ok(ips) if !ips.is_empty() => {
                    self.cache_put(name, ips.clone());
                    self.stats_mut().resolved += 1;
                    debug!(domain = name, addresses = ips.len(), "resolved");
                    return ips;
                }
                Ok(_) => {
                    last_error = Some(ResolveError::NoAddress);
                    break;
                }
                Err(e) => {
                    let retry = e.is_transient() && attempt < self.config.retry.max_retries;
                    last_error = Some(e);
                    if !retry {
                        break;
                    }
                    tokio::time::sleep(self.config.retry.backoff_for(attempt)).await;
                }
            }
        }

        let reason = last_error.as_ref().map_or("unknown", ResolveError::reason);
        debug!(domain = name, reason, "resolution failed");
        {
            let mut stats = self.stats_mut();
            stats.failed += 1;
            *stats.errors.entry(reason.to_string()).or_insert(0) += 1;
        }
        BTreeSet::new()
    }

    fn cache_get(&self, name: &str) -> Option<BTreeSet<Ipv4Addr>> {
        self.cache
            .lock()
            .expect("cache lock poisoned")
            .get(name)
            .cloned()
    }

    fn cache_put(&self, name: &str, ips: BTreeSet<Ipv4Addr>) {
        self.cache
            .lock()
            .expect("cache lock poisoned")
            .insert(name.to_string(), ips);
    }

    fn stats_mut(&self) -> MutexGuard<'_, ResolveStats> {
        self.stats.lock().expect("stats lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::time::Duration;

    type Scripted = Result<BTreeSet<Ipv4Addr>, ResolveError>;

    /// Lookup backend that replays scripted answers and counts queries.
    #[derive(Default)]
    struct ScriptedLookup {
        answers: Mutex<HashMap<String, VecDeque<Scripted>>>,
        queries: Mutex<HashMap<String, u32>>,
    }

    impl ScriptedLookup {
        fn push(&self, name: &str, answer: Scripted) {
            self.answers
                .lock()
                .unwrap()
                .entry(name.to_string())
                .or_default()
                .push_back(answer);
        }

        fn queries_for(&self, name: &str) -> u32 {
            self.queries.lock().unwrap().get(name).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl Lookup for ScriptedLookup {
        async fn lookup_ipv4(&self, name: &str) -> Scripted {
            *self
                .queries
                .lock()
                .unwrap()
                .entry(name.to_string())
                .or_insert(0) += 1;
            self.answers
                .lock()
                .unwrap()
                .get_mut(name)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Err(ResolveError::Lookup("scripted miss".into())))
        }
    }

    fn ips(addrs: &[&str]) -> BTreeSet<Ipv4Addr> {
        addrs.iter().map(|a| a.parse().unwrap()).collect()
    }

    fn fast_config() -> ResolverConfig {
        ResolverConfig::default().retry(RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        })
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_repeat_resolution_is_a_cache_hit() {
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push("a.example.com", Ok(ips(&["203.0.113.10"])));

        let resolver = Resolver::with_lookup(fast_config(), lookup.clone());
        let first = resolver.resolve_all(&names(&["a.example.com"])).await;
        let second = resolver.resolve_all(&names(&["a.example.com"])).await;

        assert_eq!(first, second);
        assert_eq!(lookup.queries_for("a.example.com"), 1);

        let stats = resolver.stats();
        assert_eq!(stats.attempted, 2);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.cached, 1);
        assert_eq!(stats.failed, 0);
    }

    #[tokio::test]
    async fn test_duplicate_names_resolved_once_per_call() {
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push("a.example.com", Ok(ips(&["203.0.113.10"])));

        let resolver = Resolver::with_lookup(fast_config(), lookup.clone());
        let results = resolver
            .resolve_all(&names(&["a.example.com", "a.example.com", "a.example.com"]))
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(lookup.queries_for("a.example.com"), 1);
        assert_eq!(resolver.stats().attempted, 1);
    }

    #[tokio::test]
    async fn test_transient_failure_retried_then_succeeds() {
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push(
            "flaky.example.com",
            Err(ResolveError::Lookup("temporary failure".into())),
        );
        lookup.push("flaky.example.com", Ok(ips(&["198.51.100.4"])));

        let resolver = Resolver::with_lookup(fast_config(), lookup.clone());
        let results = resolver.resolve_all(&names(&["flaky.example.com"])).await;

        assert_eq!(results["flaky.example.com"], ips(&["198.51.100.4"]));
        assert_eq!(lookup.queries_for("flaky.example.com"), 2);

        let stats = resolver.stats();
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.failed, 0);
    }

    #[tokio::test]
    async fn test_no_ipv4_answer_fails_without_retry() {
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push("v6only.example.com", Ok(BTreeSet::new()));

        let resolver = Resolver::with_lookup(fast_config(), lookup.clone());
        let results = resolver.resolve_all(&names(&["v6only.example.com"])).await;

        assert!(results.is_empty());
        assert_eq!(lookup.queries_for("v6only.example.com"), 1);

        let stats = resolver.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.errors["no IPv4 addresses"], 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_feed_error_histogram() {
        let lookup = Arc::new(ScriptedLookup::default());
        // No scripted answers: every query errors transiently.

        let resolver = Resolver::with_lookup(fast_config(), lookup.clone());
        let results = resolver.resolve_all(&names(&["gone.example.com"])).await;

        assert!(results.is_empty());
        // Initial attempt plus two retries.
        assert_eq!(lookup.queries_for("gone.example.com"), 3);

        let stats = resolver.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.top_errors(5), vec![("dns error".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_one_failure_never_affects_another_name() {
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push("good.example.com", Ok(ips(&["93.184.216.34"])));
        lookup.push(
            "bad.example.com",
            Err(ResolveError::Invalid("bad.example.com".into())),
        );

        let resolver = Resolver::with_lookup(fast_config(), lookup);
        let results = resolver
            .resolve_all(&names(&["good.example.com", "bad.example.com"]))
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results["good.example.com"], ips(&["93.184.216.34"]));

        let stats = resolver.stats();
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.errors["invalid name"], 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_times_out() {
        /// Backend that never answers within the attempt timeout.
        struct StalledLookup;

        #[async_trait]
        impl Lookup for StalledLookup {
            async fn lookup_ipv4(&self, _name: &str) -> Scripted {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(BTreeSet::new())
            }
        }

        let config = ResolverConfig::default()
            .attempt_timeout(Duration::from_millis(50))
            .retry(RetryPolicy {
                max_retries: 1,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(1),
            });
        let resolver = Resolver::with_lookup(config, Arc::new(StalledLookup));
        let results = resolver.resolve_all(&names(&["slow.example.com"])).await;

        assert!(results.is_empty());
        let stats = resolver.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.errors["timeout"], 1);
    }
}
