//! Shared health state for the /health endpoint.
//! Updated by the refresh task runner, read by the API.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Odds,
    Picks,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Odds => write!(f, "odds"),
            TaskKind::Picks => write!(f, "picks"),
        }
    }
}

/// Per-task run metrics.
#[derive(Default)]
pub struct TaskHealth {
    /// Unix seconds of the last successful cycle (0 = never).
    last_success_at: AtomicI64,
    /// Records written by the last successful cycle.
    last_record_count: AtomicU64,
    /// Failed cycles since the last success.
    consecutive_failures: AtomicU64,
}

impl TaskHealth {
    pub fn record_success(&self, at_unix_secs: i64, records: usize) {
        self.last_success_at.store(at_unix_secs, Ordering::Relaxed);
        self.last_record_count.store(records as u64, Ordering::Relaxed);
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TaskHealthSnapshot {
        TaskHealthSnapshot {
            last_success_at: self.last_success_at.load(Ordering::Relaxed),
            last_record_count: self.last_record_count.load(Ordering::Relaxed),
            consecutive_failures: self.consecutive_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskHealthSnapshot {
    pub last_success_at: i64,
    pub last_record_count: u64,
    pub consecutive_failures: u64,
}

#[derive(Default)]
pub struct HealthState {
    odds: TaskHealth,
    picks: TaskHealth,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task(&self, kind: TaskKind) -> &TaskHealth {
        match kind {
            TaskKind::Odds => &self.odds,
            TaskKind::Picks => &self.picks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub odds: TaskHealthSnapshot,
    pub picks: TaskHealthSnapshot,
}

impl From<&HealthState> for HealthResponse {
    fn from(state: &HealthState) -> Self {
        Self {
            status: "ok",
            odds: state.odds.snapshot(),
            picks: state.picks.snapshot(),
        }
    }
}
