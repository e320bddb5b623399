//! Per-pass results of the startup orchestrator.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// How a single admitted script ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Valid, ran, and reported success.
    Succeeded,
    /// Valid and ran, but the run reported failure.
    Failed,
    /// Failed validation; never run.
    Invalid,
    /// A repository or session error interrupted processing.
    Error { detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionOutcome {
    pub script_path: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl ExecutionOutcome {
    pub fn new(script_path: impl Into<String>, status: OutcomeStatus) -> Self {
        Self {
            script_path: script_path.into(),
            status,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == OutcomeStatus::Succeeded
    }
}

/// Everything one orchestration pass did, in discovery order.
#[derive(Debug, Clone, Serialize)]
pub struct StartupReport {
    pub pass_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// `false` if the session could not be opened or discovery failed.
    pub completed: bool,
    /// Number of scripts returned by discovery.
    pub discovered: usize,
    /// Paths skipped by the run-mode gate.
    pub denied: Vec<String>,
    /// One entry per admitted script.
    pub outcomes: Vec<ExecutionOutcome>,
}

impl StartupReport {
    pub fn begin() -> Self {
        Self {
            pass_id: Uuid::now_v7(),
            started_at: Utc::now(),
            completed: false,
            discovered: 0,
            denied: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    /// Admitted scripts that did not succeed for any reason.
    pub fn unsuccessful_count(&self) -> usize {
        self.outcomes.len() - self.succeeded_count()
    }

    pub fn outcome_for(&self, script_path: &str) -> Option<&OutcomeStatus> {
        self.outcomes
            .iter()
            .find(|o| o.script_path == script_path)
            .map(|o| &o.status)
    }
}
