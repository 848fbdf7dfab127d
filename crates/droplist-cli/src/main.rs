//! droplist: build IP blacklist/whitelist files from domain reputation
//! feeds, with shared-IP, infrastructure and bogon protection.

mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use droplist_engine::{pipeline, PassReport};
use droplist_resolver::{ResolveStats, Resolver};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "droplist", version, about = "IP/domain reputation list builder")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, default_value = "droplist.toml", env = "DROPLIST_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve whitelist domains and update the whitelist-specific list.
    Whitelist,
    /// Resolve blacklist domains under full protection and update the
    /// blacklist-specific list.
    Blacklist,
    /// Run the whitelist pass, then the blacklist pass.
    All,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    let paths = config.list_paths();
    let resolver = Resolver::new(config.resolver_config());

    match cli.command {
        Command::Whitelist => {
            let report = pipeline::run_whitelist_pass(&resolver, &paths).await?;
            log_pass("whitelist", &report);
        }
        Command::Blacklist => {
            let report = pipeline::run_blacklist_pass(&resolver, &paths).await?;
            log_pass("blacklist", &report);
        }
        Command::All => {
            let (whitelist, blacklist) = pipeline::run_all(&resolver, &paths).await?;
            log_pass("whitelist", &whitelist);
            log_pass("blacklist", &blacklist);
        }
    }

    log_summary(&resolver.stats());
    Ok(())
}

fn log_pass(name: &str, report: &PassReport) {
    info!(
        pass = name,
        domains = report.domains,
        resolved = report.resolved,
        derived = report.derived,
        skipped_shared = report.skips.shared,
        skipped_infrastructure = report.skips.infrastructure,
        skipped_bogon = report.skips.bogon,
        removed_stale = report.outcome.removed_stale,
        added = report.outcome.added,
        updated = report.outcome.updated,
        suppressed = report.outcome.suppressed,
        total = report.total,
        "pass complete"
    );
}

fn log_summary(stats: &ResolveStats) {
    info!(
        attempted = stats.attempted,
        resolved = stats.resolved,
        cached = stats.cached,
        failed = stats.failed,
        "resolution summary"
    );
    for (reason, count) in stats.top_errors(5) {
        info!(reason = %reason, count, "top failure reason");
    }
}
