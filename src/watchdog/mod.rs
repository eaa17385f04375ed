//! Consensus health watchdog.
//!
//! # Data Flow
//! ```text
//! readiness.rs   wait until the node reports started
//!     → node readiness report (logged only)
//!     → scheduler.rs   loop { sleep; probe.rs register marker; classify }
//!     → cleaner.rs     delete marker (always, errors ignored)
//!     → recovery.rs    wipe consensus dir + exit(100), only if the loop failed
//! ```
//!
//! # Design Decisions
//! - One run per process, on one spawned task
//! - Only "no leader" is retried; every other outcome skips recovery
//! - Recovery is irreversible and is not cancellable once started

pub mod cleaner;
pub mod client;
pub mod marker;
pub mod probe;
pub mod readiness;
pub mod recovery;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use crate::lifecycle::shutdown::ShutdownSignal;

pub use cleaner::MarkerCleaner;
pub use client::{ApiError, ApiResponse, HttpNodeClient, NodeApi};
pub use marker::MarkerRecord;
pub use probe::{MarkerRegistrar, ProbeOutcome};
pub use readiness::{ReadinessGate, ReadinessSource, StartedFlag, StartedSignal};
pub use recovery::{
    ProcessExit, ProcessTerminator, RecoveryAction, RecoveryTarget, RECOVERY_EXIT_CODE,
};
pub use scheduler::{ProbeReport, RetryBudget, RetryScheduler, SchedulerExit};

/// Final status of one watchdog run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunReport {
    /// The loop ended on Success or TerminalFailure; nothing was wiped.
    Healthy(ProbeReport),
    /// The consensus directory was wiped and the exit hook was called.
    Recovered(ProbeReport),
    /// Shutdown arrived before the loop finished.
    Cancelled,
}

impl RunReport {
    pub fn probe_report(&self) -> Option<&ProbeReport> {
        match self {
            RunReport::Healthy(report) | RunReport::Recovered(report) => Some(report),
            RunReport::Cancelled => None,
        }
    }
}

/// One complete readiness → probe → cleanup → recovery sequence.
pub struct Watchdog<A> {
    api: Arc<A>,
    readiness: ReadinessGate,
    budget: RetryBudget,
    recovery: RecoveryAction,
    marker: MarkerRecord,
}

impl<A: NodeApi> Watchdog<A> {
    pub fn new(
        api: Arc<A>,
        readiness: ReadinessGate,
        budget: RetryBudget,
        recovery: RecoveryAction,
    ) -> Self {
        Self {
            api,
            readiness,
            budget,
            recovery,
            marker: MarkerRecord::default(),
        }
    }

    pub async fn run(mut self, mut shutdown: ShutdownSignal) -> RunReport {
        if !self.readiness.wait(&mut shutdown).await {
            return RunReport::Cancelled;
        }
        self.log_node_readiness().await;

        let registrar = MarkerRegistrar::new(self.api.clone(), self.marker.clone());
        let exit = RetryScheduler::new(registrar, self.budget)
            .run(&mut shutdown)
            .await;

        let cleaner = MarkerCleaner::new(self.api.clone(), self.marker.clone());
        match exit {
            SchedulerExit::Cancelled { attempts } => {
                if attempts > 0 {
                    cleaner.cleanup().await;
                }
                RunReport::Cancelled
            }
            SchedulerExit::Finished(report) => {
                cleaner.cleanup().await;
                if report.succeeded {
                    RunReport::Healthy(report)
                } else {
                    self.recovery.execute().await;
                    RunReport::Recovered(report)
                }
            }
        }
    }

    async fn log_node_readiness(&self) {
        match self.api.readiness().await {
            None => {}
            Some(Ok(response)) => tracing::info!(
                status = response.status,
                message = %readiness_message(&response.body),
                "Node module readiness"
            ),
            Some(Err(e)) => tracing::info!(error = %e, "Node module readiness check failed"),
        }
    }
}

/// Pull `message` out of a JSON body, else use the body as-is.
fn readiness_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_string())
}
