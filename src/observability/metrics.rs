//! Metrics for reload confirmation.
//!
//! # Metrics
//! - `config_version_wait_seconds` (histogram): time spent waiting, by outcome
//! - `config_version_waits_total` (counter): finished waits, by outcome
//! - `config_version_fetch_failures_total` (counter): failed probe fetches, by kind
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; the host process picks the exporter
//! - Without an installed recorder every call is a no-op

use std::time::Duration;

/// Record a finished `wait_for_correct_version` call.
pub fn record_version_wait(took: Duration, confirmed: bool) {
    let outcome = if confirmed { "confirmed" } else { "timeout" };
    ::metrics::counter!("config_version_waits_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("config_version_wait_seconds", "outcome" => outcome)
        .record(took.as_secs_f64());
}

/// Record one failed fetch of the probe while polling.
pub fn record_version_fetch_failure(kind: &'static str) {
    ::metrics::counter!("config_version_fetch_failures_total", "kind" => kind).increment(1);
}
