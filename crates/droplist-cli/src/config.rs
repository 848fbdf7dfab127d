//! Run configuration for the droplist binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use droplist_engine::ListPaths;
use droplist_resolver::{ResolverConfig, RetryPolicy};

/// Configuration for a droplist run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the four list files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Resolver tuning.
    #[serde(default)]
    pub resolver: ResolverSettings,
}

/// Resolver tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Maximum lookups in flight at once.
    #[serde(default = "default_width")]
    pub max_concurrency: usize,

    /// Per-attempt timeout (seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the initial attempt for transient failures.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Base backoff delay (milliseconds); doubles per retry.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            resolver: ResolverSettings::default(),
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_concurrency: default_width(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl AppConfig {
    /// Load config from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("invalid config {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// List file locations under the configured data directory.
    #[must_use]
    pub fn list_paths(&self) -> ListPaths {
        ListPaths::under(&self.data_dir)
    }

    /// Resolver configuration built from the tuning knobs.
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::default()
            .max_concurrency(self.resolver.max_concurrency)
            .attempt_timeout(Duration::from_secs(self.resolver.timeout_secs))
            .retry(RetryPolicy {
                max_retries: self.resolver.retries,
                base_delay: Duration::from_millis(self.resolver.backoff_ms),
                ..RetryPolicy::default()
            })
    }
}

// Default value functions for serde.
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

const fn default_width() -> usize {
    100
}

const fn default_timeout_secs() -> u64 {
    3
}

const fn default_retries() -> u32 {
    2
}

const fn default_backoff_ms() -> u64 {
    100
}
