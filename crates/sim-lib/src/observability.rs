//! Observability infrastructure for the simulator
//!
//! Provides:
//! - Prometheus metrics (regeneration latency, regeneration count, stale results, last health)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Histogram buckets for regeneration latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<EngineMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct EngineMetricsInner {
    regeneration_latency_seconds: Histogram,
    regenerations: IntCounter,
    stale_results_discarded: IntCounter,
    invalid_requests: IntCounter,
    last_health_score: IntGauge,
    last_bucket_count: IntGauge,
}

impl EngineMetricsInner {
    fn new() -> Self {
        Self {
            regeneration_latency_seconds: register_histogram!(
                "telemetry_sim_regeneration_latency_seconds",
                "Time spent generating and summarising one series",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register regeneration_latency_seconds"),

            regenerations: register_int_counter!(
                "telemetry_sim_regenerations_total",
                "Total number of series regenerations"
            )
            .expect("Failed to register regenerations_total"),

            stale_results_discarded: register_int_counter!(
                "telemetry_sim_stale_results_discarded_total",
                "Regeneration results dropped because a newer request superseded them"
            )
            .expect("Failed to register stale_results_discarded_total"),

            invalid_requests: register_int_counter!(
                "telemetry_sim_invalid_requests_total",
                "Requests rejected for an invalid time range or argument"
            )
            .expect("Failed to register invalid_requests_total"),

            last_health_score: register_int_gauge!(
                "telemetry_sim_last_health_score",
                "Health score of the most recently generated summary"
            )
            .expect("Failed to register last_health_score"),

            last_bucket_count: register_int_gauge!(
                "telemetry_sim_last_bucket_count",
                "Number of buckets in the most recently generated series"
            )
            .expect("Failed to register last_bucket_count"),
        }
    }
}

/// Engine metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct EngineMetrics {
    _private: (),
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EngineMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineMetrics").finish_non_exhaustive()
    }
}

impl EngineMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EngineMetricsInner {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new)
    }

    /// Record one completed regeneration
    pub fn observe_regeneration(&self, duration_secs: f64, bucket_count: usize, health_score: u8) {
        let inner = self.inner();
        inner.regeneration_latency_seconds.observe(duration_secs);
        inner.regenerations.inc();
        inner.last_bucket_count.set(bucket_count as i64);
        inner.last_health_score.set(health_score as i64);
    }

    pub fn inc_stale_results_discarded(&self) {
        self.inner().stale_results_discarded.inc();
    }

    pub fn inc_invalid_requests(&self) {
        self.inner().invalid_requests.inc();
    }

    pub fn regenerations(&self) -> u64 {
        self.inner().regenerations.get()
    }

    pub fn stale_results_discarded(&self) -> u64 {
        self.inner().stale_results_discarded.get()
    }
}

/// Structured logger for simulator events
///
/// Provides consistent JSON-formatted logging for regenerations,
/// discarded results and lifecycle events.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Log a completed regeneration
    #[allow(clippy::too_many_arguments)]
    pub fn log_regeneration(
        &self,
        namespace: &str,
        service: &str,
        workload: &str,
        range: &str,
        bucket_count: usize,
        multiplier: f64,
        health_score: u8,
        error_rate_percent: f64,
        duration_us: u64,
    ) {
        info!(
            event = "series_regenerated",
            instance = %self.instance,
            namespace = %namespace,
            service = %service,
            workload = %workload,
            range = %range,
            bucket_count = bucket_count,
            multiplier = multiplier,
            health_score = health_score,
            error_rate_percent = error_rate_percent,
            duration_us = duration_us,
            "Regenerated telemetry series"
        );
    }

    /// Log a regeneration result dropped in favour of a newer one
    pub fn log_stale_snapshot(&self, generation: u64, latest: u64) {
        debug!(
            event = "snapshot_discarded",
            instance = %self.instance,
            generation = generation,
            latest_generation = latest,
            "Discarded superseded regeneration result"
        );
    }

    /// Log a rejected request
    pub fn log_invalid_request(&self, reason: &str) {
        warn!(
            event = "invalid_request",
            instance = %self.instance,
            reason = %reason,
            "Rejected simulator request"
        );
    }

    /// Log server startup
    pub fn log_startup(&self, version: &str, port: u16, seeded: bool) {
        info!(
            event = "server_started",
            instance = %self.instance,
            version = %version,
            port = port,
            seeded = seeded,
            "Telemetry simulator started"
        );
    }

    /// Log server shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "server_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Telemetry simulator shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_metrics_creation() {
        // Prometheus uses a global registry, so every handle shares one set
        // of metrics; assert on deltas rather than absolute values.
        let metrics = EngineMetrics::new();
        let before = metrics.regenerations();

        metrics.observe_regeneration(0.0004, 12, 5);
        metrics.inc_stale_results_discarded();
        metrics.inc_invalid_requests();

        assert!(metrics.regenerations() > before);
        assert!(metrics.stale_results_discarded() >= 1);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("test-instance");
        assert_eq!(logger.instance(), "test-instance");
        logger.log_stale_snapshot(1, 2);
    }
}
