//! Metrics for the enrichment pipeline
//!
//! Counters go through the `metrics` facade. Nothing is recorded anywhere
//! until `init` installs the Prometheus exporter, so library users and tests
//! pay nothing for them.

use std::fmt;
use std::net::SocketAddr;
use tracing::info;

/// Every metric name the crate records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    ItemsEnriched,
    ItemsReused,
    ItemsDropped,
    RemoteCalls,
    RemoteCallDuration,
    Cooldowns,
    RunsCompleted,
    RunsCancelled,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::ItemsEnriched => "vinyl_enrich_items_enriched_total",
            MetricName::ItemsReused => "vinyl_enrich_items_reused_total",
            MetricName::ItemsDropped => "vinyl_enrich_items_dropped_total",
            MetricName::RemoteCalls => "vinyl_enrich_remote_calls_total",
            MetricName::RemoteCallDuration => "vinyl_enrich_remote_call_duration_seconds",
            MetricName::Cooldowns => "vinyl_enrich_cooldowns_total",
            MetricName::RunsCompleted => "vinyl_enrich_runs_completed_total",
            MetricName::RunsCancelled => "vinyl_enrich_runs_cancelled_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Install the Prometheus exporter with an HTTP listener on `port`.
pub fn init(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))?;
    info!("Prometheus exporter listening on http://{}/metrics", addr);
    Ok(())
}

// ============================================================================
// Enrichment Metrics
// ============================================================================

pub mod enrich {
    use super::MetricName;

    pub fn item_enriched() {
        ::metrics::counter!(MetricName::ItemsEnriched.as_str()).increment(1);
    }

    pub fn item_reused() {
        ::metrics::counter!(MetricName::ItemsReused.as_str()).increment(1);
    }

    /// `reason` is one of "missing_release_id", "http_status", "malformed", "retries_exhausted"
    pub fn item_dropped(reason: &'static str) {
        ::metrics::counter!(MetricName::ItemsDropped.as_str(), "reason" => reason).increment(1);
    }

    pub fn remote_call(outcome: &'static str, secs: f64) {
        ::metrics::counter!(MetricName::RemoteCalls.as_str(), "outcome" => outcome).increment(1);
        ::metrics::histogram!(MetricName::RemoteCallDuration.as_str()).record(secs);
    }

    /// `cause` is one of "ceiling", "rate_limited", "transport"
    pub fn cooldown(cause: &'static str) {
        ::metrics::counter!(MetricName::Cooldowns.as_str(), "cause" => cause).increment(1);
    }

    pub fn run_finished(was_cancelled: bool) {
        let name = if was_cancelled {
            MetricName::RunsCancelled
        } else {
            MetricName::RunsCompleted
        };
        ::metrics::counter!(name.as_str()).increment(1);
    }
}
