//! Single probe attempt and its classification.
//!
//! # Classification
//! ```text
//! 2xx                                              → Success
//! 500 + body contains "did not find the Leader node" → RetryableFailure
//! anything else (4xx, other 5xx, transport error)   → TerminalFailure
//! ```
//!
//! Only a missing leader is worth waiting for. Any other failure means the
//! probe itself is broken or the node has a different problem, and the loop
//! stops without recovery.

use std::sync::Arc;

use crate::observability::metrics;
use crate::watchdog::client::{ApiError, ApiResponse, NodeApi};
use crate::watchdog::marker::MarkerRecord;

/// Message the node returns while no Raft leader has been elected.
pub const LEADER_NOT_FOUND: &str = "did not find the Leader node";

/// HTTP status that accompanies [`LEADER_NOT_FOUND`].
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// Outcome of one probe attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success,
    RetryableFailure,
    TerminalFailure,
}

impl ProbeOutcome {
    /// Whether the retry loop should stop on this outcome.
    pub fn ends_loop(self) -> bool {
        !matches!(self, ProbeOutcome::RetryableFailure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProbeOutcome::Success => "success",
            ProbeOutcome::RetryableFailure => "retryable_failure",
            ProbeOutcome::TerminalFailure => "terminal_failure",
        }
    }
}

/// Map a register result onto a [`ProbeOutcome`].
pub fn classify(result: &Result<ApiResponse, ApiError>) -> ProbeOutcome {
    match result {
        Ok(_) => ProbeOutcome::Success,
        Err(e) if is_leader_missing(e) => ProbeOutcome::RetryableFailure,
        Err(_) => ProbeOutcome::TerminalFailure,
    }
}

fn is_leader_missing(error: &ApiError) -> bool {
    match error {
        ApiError::Status { status, body } => {
            *status == INTERNAL_SERVER_ERROR && body.contains(LEADER_NOT_FOUND)
        }
        _ => false,
    }
}

/// Writes the marker record and classifies the result.
pub struct MarkerRegistrar<A> {
    api: Arc<A>,
    marker: MarkerRecord,
}

impl<A: NodeApi> MarkerRegistrar<A> {
    pub fn new(api: Arc<A>, marker: MarkerRecord) -> Self {
        Self { api, marker }
    }

    /// Perform one probe attempt.
    pub async fn register(&self) -> ProbeOutcome {
        tracing::info!(
            service = %self.marker.service_name,
            "Registering persistent marker instance to test the consensus write path"
        );

        let result = self.api.register_marker(&self.marker).await;
        match &result {
            Ok(response) => tracing::info!(
                status = response.status,
                body = %response.body,
                "Marker registered"
            ),
            Err(e) => tracing::error!(
                status = ?e.status(),
                error = %e,
                "Marker registration failed"
            ),
        }

        let outcome = classify(&result);
        metrics::record_probe(outcome);
        outcome
    }
}
