//! Startup hook for the watchdog.
//!
//! # Responsibilities
//! - Honor the enable switch before anything else
//! - Build the HTTP client, retry budget and recovery target from config
//! - Spawn the watchdog on its own task and hand back a handle
//!
//! # Design Decisions
//! - Fire-and-forget: the caller never waits on the watchdog unless it wants to
//! - Disabled means nothing is spawned and no request is ever sent
//! - Construction errors are returned, not logged-and-ignored

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};

use crate::config::WatchdogConfig;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::watchdog::{
    ApiError, HttpNodeClient, NodeApi, ProcessExit, ProcessTerminator, ReadinessGate,
    ReadinessSource, RecoveryAction, RecoveryTarget, RetryBudget, RunReport, Watchdog,
};

/// Handle to the spawned watchdog task.
pub struct WatchdogHandle {
    task: JoinHandle<RunReport>,
}

impl WatchdogHandle {
    /// Wait for the run to finish.
    pub async fn join(self) -> Result<RunReport, JoinError> {
        self.task.await
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Start the watchdog against the node described by `config`.
///
/// Returns `Ok(None)` when the watchdog is disabled.
pub fn launch(
    config: &WatchdogConfig,
    readiness: ReadinessSource,
    shutdown: ShutdownSignal,
) -> Result<Option<WatchdogHandle>, ApiError> {
    if !config.monitor.enabled {
        tracing::info!("Consensus watchdog disabled");
        return Ok(None);
    }

    let api = HttpNodeClient::new(
        &config.node,
        &config.auth,
        Duration::from_millis(config.monitor.request_timeout_ms),
    )?;

    Ok(launch_with(
        config,
        Arc::new(api),
        readiness,
        Arc::new(ProcessTerminator),
        shutdown,
    ))
}

/// [`launch`] with explicit collaborators.
pub fn launch_with<A>(
    config: &WatchdogConfig,
    api: Arc<A>,
    readiness: ReadinessSource,
    exit: Arc<dyn ProcessExit>,
    shutdown: ShutdownSignal,
) -> Option<WatchdogHandle>
where
    A: NodeApi + 'static,
{
    if !config.monitor.enabled {
        tracing::info!("Consensus watchdog disabled");
        return None;
    }

    let target = RecoveryTarget::from_config(&config.node);
    let budget = RetryBudget::from_config(&config.monitor);
    tracing::info!(
        max_attempts = budget.max_attempts(),
        interval_ms = budget.interval().as_millis() as u64,
        consensus_dir = %target.path().display(),
        "Consensus watchdog enabled"
    );

    let watchdog = Watchdog::new(
        api,
        ReadinessGate::new(readiness),
        budget,
        RecoveryAction::new(target, exit),
    );

    let task = tokio::spawn(async move {
        let report = watchdog.run(shutdown).await;
        tracing::info!(?report, "Consensus watchdog finished");
        report
    });

    Some(WatchdogHandle { task })
}
