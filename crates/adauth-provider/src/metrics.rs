//! Authentication metrics
//!
//! Recorded through the `metrics` facade; installing an exporter is left to the host.

use adauth_core::types::AuthOutcome;
use metrics::{counter, histogram};

/// Metric names
pub mod names {
    pub const ATTEMPTS_TOTAL: &str = "adauth_attempts_total";
    pub const PHASE_FAILURES_TOTAL: &str = "adauth_phase_failures_total";
    pub const ATTEMPT_DURATION_SECONDS: &str = "adauth_attempt_duration_seconds";
}

/// Stage of an attempt that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unavailable,
    Search,
    Bind,
    Timeout,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Unavailable => "unavailable",
            Phase::Search => "search",
            Phase::Bind => "bind",
            Phase::Timeout => "timeout",
        }
    }
}

pub fn record_attempt(outcome: AuthOutcome, duration_secs: f64) {
    counter!(names::ATTEMPTS_TOTAL, "outcome" => outcome.as_str()).increment(1);
    histogram!(names::ATTEMPT_DURATION_SECONDS).record(duration_secs);
}

pub fn record_phase_failure(phase: Phase) {
    counter!(names::PHASE_FAILURES_TOTAL, "phase" => phase.as_str()).increment(1);
}
