//! Chart projections
//!
//! Maps a metric selector onto the primary/secondary field pair a chart
//! draws. Projections copy values out of the series and never touch it.

use crate::models::{MetricSample, Series};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metric chosen in the chart selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKey {
    #[default]
    Requests,
    Errors,
    Latency,
    Throughput,
}

impl MetricKey {
    pub const ALL: [MetricKey; 4] = [
        MetricKey::Requests,
        MetricKey::Errors,
        MetricKey::Latency,
        MetricKey::Throughput,
    ];

    /// Parse a selector value; anything unrecognised selects requests
    pub fn parse_lossy(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "errors" => MetricKey::Errors,
            "latency" => MetricKey::Latency,
            "throughput" => MetricKey::Throughput,
            _ => MetricKey::Requests,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::Requests => "requests",
            MetricKey::Errors => "errors",
            MetricKey::Latency => "latency",
            MetricKey::Throughput => "throughput",
        }
    }

    fn pairing(&self) -> Pairing {
        match self {
            MetricKey::Requests => Pairing {
                primary_name: "Requests",
                secondary_name: "Errors",
                primary: |s| s.requests as f64,
                secondary: |s| s.errors as f64,
            },
            MetricKey::Errors => Pairing {
                primary_name: "Errors",
                secondary_name: "Success Rate",
                primary: |s| s.errors as f64,
                secondary: |s| s.success_rate,
            },
            MetricKey::Latency => Pairing {
                primary_name: "Latency (ms)",
                secondary_name: "P95 Latency (ms)",
                primary: |s| s.latency,
                secondary: |s| s.p95_latency,
            },
            MetricKey::Throughput => Pairing {
                primary_name: "Throughput",
                secondary_name: "QPS",
                primary: |s| s.throughput as f64,
                secondary: |s| s.qps as f64,
            },
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dashboard chart tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardView {
    #[default]
    Overview,
    Resources,
    Performance,
}

impl DashboardView {
    /// Parse a tab name; anything unrecognised selects the overview
    pub fn parse_lossy(view: &str) -> Self {
        match view.trim().to_ascii_lowercase().as_str() {
            "resources" => DashboardView::Resources,
            "performance" => DashboardView::Performance,
            _ => DashboardView::Overview,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardView::Overview => "overview",
            DashboardView::Resources => "resources",
            DashboardView::Performance => "performance",
        }
    }

    fn pairing(&self) -> Pairing {
        match self {
            DashboardView::Overview => MetricKey::Requests.pairing(),
            DashboardView::Resources => Pairing {
                primary_name: "CPU %",
                secondary_name: "Memory %",
                primary: |s| s.cpu,
                secondary: |s| s.memory,
            },
            DashboardView::Performance => MetricKey::Latency.pairing(),
        }
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Pairing {
    primary_name: &'static str,
    secondary_name: &'static str,
    primary: fn(&MetricSample) -> f64,
    secondary: fn(&MetricSample) -> f64,
}

impl Pairing {
    fn apply(&self, series: &Series) -> Vec<ChartPoint> {
        series
            .iter()
            .map(|s| ChartPoint {
                time: s.time.clone(),
                primary: (self.primary)(s),
                secondary: (self.secondary)(s),
                primary_name: self.primary_name,
                secondary_name: self.secondary_name,
            })
            .collect()
    }
}

/// One projected bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub time: String,
    pub primary: f64,
    pub secondary: f64,
    pub primary_name: &'static str,
    pub secondary_name: &'static str,
}

/// Projection of a series for one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartProjection {
    /// Selector the projection was built for, e.g. `latency` or `resources`
    pub key: &'static str,
    pub primary_name: &'static str,
    pub secondary_name: &'static str,
    pub points: Vec<ChartPoint>,
}

/// Project `series` for a metric selector value
pub fn project(series: &Series, metric_key: &str) -> ChartProjection {
    project_metric(series, MetricKey::parse_lossy(metric_key))
}

pub fn project_metric(series: &Series, key: MetricKey) -> ChartProjection {
    let pairing = key.pairing();
    ChartProjection {
        key: key.as_str(),
        primary_name: pairing.primary_name,
        secondary_name: pairing.secondary_name,
        points: pairing.apply(series),
    }
}

/// Project `series` for a dashboard tab
pub fn project_view(series: &Series, view: DashboardView) -> ChartProjection {
    let pairing = view.pairing();
    ChartProjection {
        key: view.as_str(),
        primary_name: pairing.primary_name,
        secondary_name: pairing.secondary_name,
        points: pairing.apply(series),
    }
}
