//! Core data models for the telemetry simulator

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ALL_NAMESPACES: &str = "All Namespaces";
pub const ALL_SERVICES: &str = "All Services";
pub const ALL_WORKLOADS: &str = "All Workloads";

/// Three-dimensional filter chosen by the host UI
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSelection {
    pub namespace: String,
    pub service: String,
    pub workload: String,
}

impl FilterSelection {
    pub fn new(
        namespace: impl Into<String>,
        service: impl Into<String>,
        workload: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            service: service.into(),
            workload: workload.into(),
        }
    }
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self::new(ALL_NAMESPACES, ALL_SERVICES, ALL_WORKLOADS)
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.service, self.workload)
    }
}

/// Time range offered by the range picker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::OneHour,
        TimeRange::SixHours,
        TimeRange::OneDay,
        TimeRange::SevenDays,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::OneHour => "1h",
            TimeRange::SixHours => "6h",
            TimeRange::OneDay => "24h",
            TimeRange::SevenDays => "7d",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1h" => Ok(TimeRange::OneHour),
            "6h" => Ok(TimeRange::SixHours),
            "24h" => Ok(TimeRange::OneDay),
            "7d" => Ok(TimeRange::SevenDays),
            other => Err(EngineError::InvalidArgument(format!(
                "unknown time range '{}', expected one of 1h, 6h, 24h, 7d",
                other
            ))),
        }
    }
}

/// Number of buckets and width of each bucket for a time range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSpec {
    pub bucket_count: usize,
    pub bucket_minutes: u32,
}

impl BucketSpec {
    pub const fn new(bucket_count: usize, bucket_minutes: u32) -> Self {
        Self {
            bucket_count,
            bucket_minutes,
        }
    }
}

/// One synthesized time bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    /// 24-hour `HH:MM` label of the bucket start
    pub time: String,
    /// Bucket start, milliseconds since the Unix epoch
    pub timestamp: i64,
    pub requests: u64,
    pub errors: u64,
    /// Mean latency in milliseconds
    pub latency: f64,
    pub cpu: f64,
    pub memory: f64,
    pub throughput: u64,
    pub network_in: f64,
    pub network_out: f64,
    pub success_rate: f64,
    pub p95_latency: f64,
    pub p99_latency: f64,
    pub active_connections: u64,
    pub qps: u64,
}

/// Ordered, time-ascending sequence of samples produced by one regeneration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series(Vec<MetricSample>);

impl Series {
    pub(crate) fn from_samples(samples: Vec<MetricSample>) -> Self {
        Self(samples)
    }

    pub fn samples(&self) -> &[MetricSample] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetricSample> {
        self.0.iter()
    }

    /// Last `n` samples (or all of them when the series is shorter)
    pub fn tail(&self, n: usize) -> &[MetricSample] {
        let start = self.0.len().saturating_sub(n);
        &self.0[start..]
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a MetricSample;
    type IntoIter = std::slice::Iter<'a, MetricSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
impl From<Vec<MetricSample>> for Series {
    fn from(samples: Vec<MetricSample>) -> Self {
        Self(samples)
    }
}

/// Health tier out of a fixed total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub current: u8,
    pub total: u8,
}

/// Summary over the trailing rollup window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupSummary {
    pub service_health: ServiceHealth,
    pub error_rate_percent: f64,
    pub avg_latency_ms: f64,
    pub throughput_per_min: f64,
    pub avg_cpu_percent: f64,
    pub avg_memory_percent: f64,
    pub uptime_percent: f64,
    /// Number of buckets the summary was computed over
    pub window_len: usize,
}

/// Whole-series totals shown on the KPI cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesTotals {
    pub total_requests: u64,
    pub total_errors: u64,
    pub error_rate_percent: f64,
    pub avg_latency_ms: f64,
    pub total_throughput: u64,
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Percentage of `part` in `whole`, 0 when `whole` is 0
pub fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}
