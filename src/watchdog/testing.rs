//! Scripted collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::watchdog::client::{ApiError, ApiResponse, NodeApi};
use crate::watchdog::marker::MarkerRecord;
use crate::watchdog::probe::{ProbeOutcome, INTERNAL_SERVER_ERROR, LEADER_NOT_FOUND};
use crate::watchdog::recovery::ProcessExit;

/// Answers register calls from a fixed script of outcomes.
///
/// Once the script runs out every further register is a missing leader.
pub struct ScriptedApi {
    script: Mutex<VecDeque<ProbeOutcome>>,
    fail_delete: bool,
    fail_readiness: bool,
    registers: AtomicU32,
    deletes: AtomicU32,
    readiness: AtomicU32,
}

impl ScriptedApi {
    pub fn new(script: &[ProbeOutcome]) -> Self {
        Self {
            script: Mutex::new(script.iter().copied().collect()),
            fail_delete: false,
            fail_readiness: false,
            registers: AtomicU32::new(0),
            deletes: AtomicU32::new(0),
            readiness: AtomicU32::new(0),
        }
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn failing_readiness(mut self) -> Self {
        self.fail_readiness = true;
        self
    }

    pub fn register_calls(&self) -> u32 {
        self.registers.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> u32 {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn readiness_calls(&self) -> u32 {
        self.readiness.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeApi for ScriptedApi {
    async fn register_marker(&self, _marker: &MarkerRecord) -> Result<ApiResponse, ApiError> {
        self.registers.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ProbeOutcome::RetryableFailure);

        match next {
            ProbeOutcome::Success => Ok(ApiResponse { status: 200, body: "ok".into() }),
            ProbeOutcome::RetryableFailure => Err(ApiError::Status {
                status: INTERNAL_SERVER_ERROR,
                body: format!("caused: {};", LEADER_NOT_FOUND),
            }),
            ProbeOutcome::TerminalFailure => Err(ApiError::Status {
                status: 403,
                body: "unknown user!".into(),
            }),
        }
    }

    async fn delete_marker(&self, _marker: &MarkerRecord) -> Result<ApiResponse, ApiError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete {
            Err(ApiError::Status { status: 500, body: "delete failed".into() })
        } else {
            Ok(ApiResponse { status: 200, body: "ok".into() })
        }
    }

    async fn readiness(&self) -> Option<Result<ApiResponse, ApiError>> {
        self.readiness.fetch_add(1, Ordering::SeqCst);
        if self.fail_readiness {
            Some(Err(ApiError::Status { status: 500, body: "naming not ready".into() }))
        } else {
            Some(Ok(ApiResponse { status: 200, body: "OK".into() }))
        }
    }
}

/// Records exit codes instead of terminating.
#[derive(Default)]
pub struct RecordingExit {
    codes: Mutex<Vec<i32>>,
}

impl RecordingExit {
    pub fn codes(&self) -> Vec<i32> {
        self.codes.lock().unwrap().clone()
    }
}

impl ProcessExit for RecordingExit {
    fn exit(&self, code: i32) {
        self.codes.lock().unwrap().push(code);
    }
}
