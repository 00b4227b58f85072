//! Rollup summaries over the trailing window of a series
//!
//! Sums traffic over the last `window` buckets, averages the gauges and
//! scores service health with an ordered threshold ladder. Every ratio
//! falls back to 0 when its denominator is 0, so summaries are always
//! finite.

use crate::config::DEFAULT_ROLLUP_WINDOW;
use crate::models::{percent_of, MetricSample, RollupSummary, Series, SeriesTotals, ServiceHealth};

/// Highest health tier
pub const HEALTH_TOTAL: u8 = 5;

/// Bucket error rate (percent) above which a bucket does not count as up
const UPTIME_ERROR_RATE_LIMIT: f64 = 5.0;

/// Health ladder rows: (max error rate %, max avg latency ms, score)
///
/// Evaluated top-down with strict comparisons; the first match wins.
const HEALTH_LADDER: [(f64, f64, u8); 3] = [(1.0, 200.0, 5), (2.0, 300.0, 4), (5.0, 500.0, 3)];

/// Score when no ladder row matches
const HEALTH_FLOOR: u8 = 2;

/// Reduces a series into a [`RollupSummary`]
#[derive(Debug, Clone, Copy)]
pub struct RollupAggregator {
    window: usize,
}

impl RollupAggregator {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn aggregate(&self, series: &Series) -> RollupSummary {
        aggregate(series, self.window)
    }
}

impl Default for RollupAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_ROLLUP_WINDOW)
    }
}

/// Summarise the last `min(window, len)` samples of `series`
///
/// A window without traffic scores the health floor: there is nothing to
/// call healthy, and a score of 5 would hide a silent service.
pub fn aggregate(series: &Series, window: usize) -> RollupSummary {
    let samples = series.tail(window);

    let total_requests = saturating_total(samples, |s| s.requests);
    let total_errors = saturating_total(samples, |s| s.errors);
    let error_rate_percent = percent_of(total_errors, total_requests);

    let avg_latency_ms = mean(samples, |s| s.latency);
    let up_buckets = samples.iter().filter(|s| is_up(s)).count();

    let current = if total_requests == 0 {
        HEALTH_FLOOR
    } else {
        health_score(error_rate_percent, avg_latency_ms)
    };

    RollupSummary {
        service_health: ServiceHealth {
            current,
            total: HEALTH_TOTAL,
        },
        error_rate_percent,
        avg_latency_ms,
        throughput_per_min: mean(samples, |s| s.throughput as f64),
        avg_cpu_percent: mean(samples, |s| s.cpu),
        avg_memory_percent: mean(samples, |s| s.memory),
        uptime_percent: percent_of(up_buckets as u64, samples.len() as u64),
        window_len: samples.len(),
    }
}

/// Health tier for an error rate (percent) and average latency (ms)
pub fn health_score(error_rate_percent: f64, avg_latency_ms: f64) -> u8 {
    HEALTH_LADDER
        .iter()
        .find(|(max_error, max_latency, _)| {
            error_rate_percent < *max_error && avg_latency_ms < *max_latency
        })
        .map(|(_, _, score)| *score)
        .unwrap_or(HEALTH_FLOOR)
}

/// Whole-series totals for KPI cards
pub fn totals(series: &Series) -> SeriesTotals {
    let samples = series.samples();
    let total_requests = saturating_total(samples, |s| s.requests);
    let total_errors = saturating_total(samples, |s| s.errors);

    SeriesTotals {
        total_requests,
        total_errors,
        error_rate_percent: percent_of(total_errors, total_requests),
        avg_latency_ms: mean(samples, |s| s.latency),
        total_throughput: saturating_total(samples, |s| s.throughput),
    }
}

// Counts saturate at u64::MAX instead of overflowing
fn saturating_total(samples: &[MetricSample], field: impl Fn(&MetricSample) -> u64) -> u64 {
    samples.iter().map(field).fold(0u64, u64::saturating_add)
}

fn is_up(sample: &MetricSample) -> bool {
    sample.requests > 0 && percent_of(sample.errors, sample.requests) < UPTIME_ERROR_RATE_LIMIT
}

fn mean(samples: &[MetricSample], field: impl Fn(&MetricSample) -> f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(field).sum();
    let value = sum / samples.len() as f64;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(requests: u64, errors: u64, latency: f64) -> MetricSample {
        MetricSample {
            time: "00:00".to_string(),
            timestamp: 0,
            requests,
            errors,
            latency,
            cpu: 40.0,
            memory: 50.0,
            throughput: requests * 8 / 10,
            network_in: 100.0,
            network_out: 80.0,
            success_rate: crate::generator::success_rate(requests, errors),
            p95_latency: latency * 1.5,
            p99_latency: latency * 2.1,
            active_connections: requests / 10,
            qps: 0,
        }
    }

    fn uniform_series(requests: u64, errors: u64, latency: f64, len: usize) -> Series {
        Series::from(vec![sample(requests, errors, latency); len])
    }

    #[test]
    fn test_health_boundary_scenarios() {
        assert_eq!(health_score(0.5, 150.0), 5);
        assert_eq!(health_score(1.5, 250.0), 4);
        assert_eq!(health_score(3.0, 400.0), 3);
        assert_eq!(health_score(6.0, 600.0), 2);
    }

    #[test]
    fn test_health_thresholds_are_strict() {
        assert_eq!(health_score(1.0, 100.0), 4);
        assert_eq!(health_score(0.1, 200.0), 4);
        assert_eq!(health_score(4.99, 499.0), 3);
        assert_eq!(health_score(5.0, 100.0), 2);
        // low error rate does not rescue high latency
        assert_eq!(health_score(0.0, 900.0), 2);
    }

    #[test]
    fn test_aggregate_scenarios_through_series() {
        let cases = [
            (5, 150.0, 5),
            (15, 250.0, 4),
            (30, 400.0, 3),
            (60, 600.0, 2),
        ];
        for (errors, latency, expected) in cases {
            let summary = aggregate(&uniform_series(1000, errors, latency, 6), 6);
            assert_eq!(summary.service_health.current, expected);
            assert_eq!(summary.service_health.total, 5);
        }
    }

    #[test]
    fn test_empty_series() {
        let summary = aggregate(&Series::default(), 6);
        assert_eq!(summary.error_rate_percent, 0.0);
        assert_eq!(summary.avg_latency_ms, 0.0);
        assert_eq!(summary.throughput_per_min, 0.0);
        assert_eq!(summary.uptime_percent, 0.0);
        assert_eq!(summary.window_len, 0);
        assert_eq!(summary.service_health.current, 2);
    }

    #[test]
    fn test_zero_traffic_series() {
        let summary = aggregate(&uniform_series(0, 0, 120.0, 8), 6);
        assert_eq!(summary.error_rate_percent, 0.0);
        assert!(summary.error_rate_percent.is_finite());
        assert!(summary.avg_latency_ms.is_finite());
        assert_eq!(summary.uptime_percent, 0.0);
        assert_eq!(summary.service_health.current, 2);
    }

    #[test]
    fn test_only_trailing_window_counts() {
        let mut samples = vec![sample(1000, 500, 900.0); 4];
        samples.extend(vec![sample(1000, 5, 100.0); 6]);
        let summary = aggregate(&Series::from(samples), 6);
        assert_eq!(summary.window_len, 6);
        assert_eq!(summary.error_rate_percent, 0.5);
        assert_eq!(summary.avg_latency_ms, 100.0);
        assert_eq!(summary.service_health.current, 5);
        assert_eq!(summary.uptime_percent, 100.0);
    }

    #[test]
    fn test_short_series_uses_all_samples() {
        let summary = aggregate(&uniform_series(200, 2, 150.0, 3), 6);
        assert_eq!(summary.window_len, 3);
        assert_eq!(summary.error_rate_percent, 1.0);
    }

    #[test]
    fn test_averages() {
        let samples = vec![sample(100, 0, 100.0), sample(300, 0, 200.0)];
        let summary = aggregate(&Series::from(samples), 6);
        assert_eq!(summary.avg_latency_ms, 150.0);
        assert_eq!(summary.throughput_per_min, 160.0);
        assert_eq!(summary.avg_cpu_percent, 40.0);
        assert_eq!(summary.avg_memory_percent, 50.0);
    }

    #[test]
    fn test_uptime_counts_failing_buckets() {
        let samples = vec![
            sample(100, 0, 100.0),
            sample(100, 10, 100.0),
            sample(0, 0, 100.0),
            sample(100, 1, 100.0),
        ];
        let summary = aggregate(&Series::from(samples), 6);
        assert_eq!(summary.uptime_percent, 50.0);
    }

    #[test]
    fn test_throughput_per_min_is_window_average() {
        let aggregator = RollupAggregator::default();
        let mut samples = vec![sample(100, 0, 100.0); 4];
        samples.extend(vec![sample(1000, 0, 100.0); 6]);
        let summary = aggregator.aggregate(&Series::from(samples));
        assert_eq!(summary.throughput_per_min, 800.0);
    }

    #[test]
    fn test_huge_counts_saturate() {
        let mut big = sample(0, 0, 100.0);
        big.requests = u64::MAX;
        big.throughput = u64::MAX;
        let series = Series::from(vec![big; 6]);

        let summary = aggregate(&series, 6);
        assert_eq!(summary.error_rate_percent, 0.0);
        assert_eq!(summary.service_health.current, 5);
        assert!(summary.throughput_per_min.is_finite());

        let t = totals(&series);
        assert_eq!(t.total_requests, u64::MAX);
        assert_eq!(t.total_throughput, u64::MAX);
    }

    #[test]
    fn test_totals() {
        let samples = vec![sample(1000, 10, 100.0), sample(1000, 30, 300.0)];
        let t = totals(&Series::from(samples));
        assert_eq!(t.total_requests, 2000);
        assert_eq!(t.total_errors, 40);
        assert_eq!(t.error_rate_percent, 2.0);
        assert_eq!(t.avg_latency_ms, 200.0);
        assert_eq!(t.total_throughput, 1600);

        let empty = totals(&Series::default());
        assert_eq!(empty.error_rate_percent, 0.0);
        assert_eq!(empty.avg_latency_ms, 0.0);
    }
}
