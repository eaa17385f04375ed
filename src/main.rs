//! Consensus watchdog sidecar.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────── consensus-watchdog ────────────────────────┐
//!   │                                                                    │
//!   │  config ──▶ lifecycle::startup ──▶ watchdog task                   │
//!   │                                      │                             │
//!   │             readiness gate ◀─────────┤  GET base URL until it      │
//!   │                                      │  answers                    │
//!   │             retry scheduler ─────────┼──▶ POST marker ──────────┐  │
//!   │                                      │                          │  │
//!   │             marker cleaner ──────────┼──▶ DELETE marker ────────┤  │
//!   │                                      │                          ▼  │
//!   │             recovery ────────────────┘  rm -r data/protocol/raft   │
//!   │                                          exit(100)      node API   │
//!   └────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use consensus_watchdog::config::load_or_default;
use consensus_watchdog::lifecycle::{self, signals, Shutdown};
use consensus_watchdog::observability::{logging, metrics};
use consensus_watchdog::watchdog::readiness::{NodeReachability, ReadinessSource};

/// Sidecar command line.
///
/// Exit status 100 means the node's consensus directory was deleted. The
/// sidecar exits, not the node, so the supervisor must restart the node
/// process itself (and then this sidecar) when it sees that status.
#[derive(Parser)]
#[command(name = "consensus-watchdog")]
#[command(
    about = "Verifies the local consensus layer can commit, wiping it if stuck",
    long_about = None
)]
#[command(
    after_help = "Exit status 100: consensus state was wiped; \
                  restart the node, not just this sidecar."
)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable the watchdog regardless of configuration.
    #[arg(long)]
    enable: bool,

    /// Node home directory (the consensus dir lives below it).
    #[arg(long)]
    node_home: Option<PathBuf>,

    /// Maximum number of probe attempts.
    #[arg(long)]
    max_retries: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if cli.enable {
        config.monitor.enabled = true;
    }
    if let Some(home) = cli.node_home {
        config.node.home = home;
    }
    if let Some(max_retries) = cli.max_retries {
        config.monitor.max_retries = max_retries.max(1);
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("consensus-watchdog v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let reachability = NodeReachability::from_config(
        &config.node,
        Duration::from_millis(config.monitor.request_timeout_ms),
    )?;
    let readiness = ReadinessSource::poll(
        Arc::new(reachability),
        Duration::from_millis(config.monitor.readiness_poll_ms),
    );

    let shutdown = Shutdown::new();
    let Some(handle) = lifecycle::launch(&config, readiness, shutdown.signal())? else {
        return Ok(());
    };

    let mut run = std::pin::pin!(handle.join());
    let report = tokio::select! {
        report = &mut run => report?,
        _ = signals::terminate_requested() => {
            shutdown.trigger();
            run.await?
        }
    };
    tracing::info!(?report, "Watchdog run complete");

    tracing::info!("Shutdown complete");
    Ok(())
}
