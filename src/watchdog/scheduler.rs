//! Bounded, interval-spaced repetition of the probe.
//!
//! # States
//! ```text
//! Idle    → Probing  after the probe interval elapses
//! Probing → Idle     RetryableFailure and budget left
//! Probing → Done     Success, TerminalFailure, or budget exhausted
//! ```
//!
//! `succeeded` is true whenever the loop ended on an outcome that stops it
//! (Success or TerminalFailure). Only a budget exhausted on
//! RetryableFailure counts as failed.

use std::time::Duration;

use tokio::time::sleep;

use crate::config::MonitorConfig;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::watchdog::client::NodeApi;
use crate::watchdog::probe::{MarkerRegistrar, ProbeOutcome};

/// Attempt counter plus the limits it is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    attempts: u32,
    max_attempts: u32,
    interval: Duration,
}

impl RetryBudget {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            interval,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.probe_interval_ms),
        )
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    fn consume(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }
}

/// Result of a completed probe loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    pub succeeded: bool,
    pub attempts: u32,
    pub max_attempts: u32,
    pub last_outcome: Option<ProbeOutcome>,
}

/// How the probe loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerExit {
    Finished(ProbeReport),
    Cancelled { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchedulerState {
    Idle,
    Probing,
    Done,
}

/// Drives [`MarkerRegistrar`] until a loop-ending outcome or budget exhaustion.
pub struct RetryScheduler<A> {
    registrar: MarkerRegistrar<A>,
    budget: RetryBudget,
}

impl<A: NodeApi> RetryScheduler<A> {
    pub fn new(registrar: MarkerRegistrar<A>, budget: RetryBudget) -> Self {
        Self { registrar, budget }
    }

    pub async fn run(mut self, shutdown: &mut ShutdownSignal) -> SchedulerExit {
        let mut state = SchedulerState::Idle;
        let mut last_outcome = None;

        while state != SchedulerState::Done {
            state = match state {
                SchedulerState::Idle => {
                    tokio::select! {
                        _ = sleep(self.budget.interval()) => SchedulerState::Probing,
                        _ = shutdown.recv() => {
                            tracing::info!(
                                attempts = self.budget.attempts(),
                                "Probe loop cancelled by shutdown"
                            );
                            return SchedulerExit::Cancelled {
                                attempts: self.budget.attempts(),
                            };
                        }
                    }
                }
                SchedulerState::Probing => {
                    let attempt = self.budget.consume();
                    tracing::info!(
                        "Starting probe, try {}/{}",
                        attempt,
                        self.budget.max_attempts()
                    );

                    let outcome = self.registrar.register().await;
                    last_outcome = Some(outcome);

                    if outcome.ends_loop() || self.budget.exhausted() {
                        SchedulerState::Done
                    } else {
                        SchedulerState::Idle
                    }
                }
                SchedulerState::Done => SchedulerState::Done,
            };
        }

        let succeeded = last_outcome.is_some_and(ProbeOutcome::ends_loop);
        tracing::info!(
            succeeded,
            outcome = last_outcome.map(ProbeOutcome::as_str),
            "Probe result: {}, try: {}/{}",
            succeeded,
            self.budget.attempts(),
            self.budget.max_attempts()
        );

        SchedulerExit::Finished(ProbeReport {
            succeeded,
            attempts: self.budget.attempts(),
            max_attempts: self.budget.max_attempts(),
            last_outcome,
        })
    }
}
