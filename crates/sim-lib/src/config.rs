//! Injectable engine configuration
//!
//! Weight tables, the range table and every generation band live here so a
//! host can extend its catalog without touching the generator. All structs
//! deserialize with defaults, so a config file only needs the keys it
//! overrides.

use crate::error::{EngineError, Result};
use crate::models::{BucketSpec, TimeRange};
use crate::status::IndicatorThresholds;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Trailing buckets used for the rollup summary
pub const DEFAULT_ROLLUP_WINDOW: usize = 6;

/// Weight applied to unmapped and "All ..." filter values
pub const NEUTRAL_WEIGHT: f64 = 1.0;

/// Largest accepted traffic weight; three of them times the request peak
/// stays far inside `u64`
pub const MAX_WEIGHT: f64 = 1_000.0;

/// Latency baseline for workloads without a tier entry
pub const DEFAULT_LATENCY_BASELINE_MS: f64 = 160.0;

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tables: WeightTables,
    pub ranges: Vec<RangeEntry>,
    pub generator: GeneratorConfig,
    pub rollup_window: usize,
    pub thresholds: IndicatorThresholds,
    pub catalog: Catalog,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tables: WeightTables::default(),
            ranges: default_ranges(),
            generator: GeneratorConfig::default(),
            rollup_window: DEFAULT_ROLLUP_WINDOW,
            thresholds: IndicatorThresholds::default(),
            catalog: Catalog::default(),
        }
    }
}

impl EngineConfig {
    /// Bucket layout for a time range
    pub fn bucket_spec(&self, range: TimeRange) -> Result<BucketSpec> {
        self.ranges
            .iter()
            .find(|entry| entry.range == range)
            .map(RangeEntry::spec)
            .ok_or_else(|| {
                EngineError::InvalidArgument(format!("time range {} is not configured", range))
            })
    }

    /// Check that the tables can only ever produce a well-formed series
    pub fn validate(&self) -> Result<()> {
        self.tables.validate()?;
        self.generator.validate()?;

        if self.rollup_window == 0 {
            return Err(EngineError::InvalidConfig(
                "rollup_window must be at least 1".to_string(),
            ));
        }

        for (idx, entry) in self.ranges.iter().enumerate() {
            if entry.bucket_count == 0 || entry.bucket_minutes == 0 {
                return Err(EngineError::InvalidConfig(format!(
                    "range {} needs a positive bucket count and width",
                    entry.range
                )));
            }
            if self.ranges[..idx].iter().any(|e| e.range == entry.range) {
                return Err(EngineError::InvalidConfig(format!(
                    "range {} is configured twice",
                    entry.range
                )));
            }
        }

        Ok(())
    }
}

/// One row of the range table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeEntry {
    pub range: TimeRange,
    pub bucket_count: usize,
    pub bucket_minutes: u32,
}

impl RangeEntry {
    pub const fn new(range: TimeRange, bucket_count: usize, bucket_minutes: u32) -> Self {
        Self {
            range,
            bucket_count,
            bucket_minutes,
        }
    }

    pub fn spec(&self) -> BucketSpec {
        BucketSpec::new(self.bucket_count, self.bucket_minutes)
    }
}

fn default_ranges() -> Vec<RangeEntry> {
    vec![
        RangeEntry::new(TimeRange::OneHour, 12, 5),
        RangeEntry::new(TimeRange::SixHours, 24, 15),
        RangeEntry::new(TimeRange::OneDay, 48, 30),
        RangeEntry::new(TimeRange::SevenDays, 96, 60),
    ]
}

/// Per-dimension lookup tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightTables {
    pub namespaces: HashMap<String, f64>,
    pub services: HashMap<String, f64>,
    pub workloads: HashMap<String, f64>,
    /// Latency tier per workload, in milliseconds
    pub latency_baselines_ms: HashMap<String, f64>,
    pub default_latency_baseline_ms: f64,
}

impl Default for WeightTables {
    fn default() -> Self {
        Self {
            namespaces: table(&[("istio-system", 1.5), ("default", 1.2)]),
            services: table(&[("productpage", 1.3), ("reviews", 1.1)]),
            workloads: table(&[("reviews-v2", 1.1), ("reviews-v3", 1.2)]),
            latency_baselines_ms: table(&[
                ("reviews-v1", 220.0),
                ("productpage-v1", 220.0),
                ("details-v1", 220.0),
                ("reviews-v2", 180.0),
                ("reviews-v3", 120.0),
            ]),
            default_latency_baseline_ms: DEFAULT_LATENCY_BASELINE_MS,
        }
    }
}

impl WeightTables {
    fn validate(&self) -> Result<()> {
        let tables = [
            ("namespaces", &self.namespaces),
            ("services", &self.services),
            ("workloads", &self.workloads),
            ("latency_baselines_ms", &self.latency_baselines_ms),
        ];
        for (name, table) in tables {
            if let Some((key, weight)) = table.iter().find(|(_, w)| !is_positive(**w)) {
                return Err(EngineError::InvalidConfig(format!(
                    "{} entry '{}' must be a positive finite number, got {}",
                    name, key, weight
                )));
            }
        }
        let traffic = [
            ("namespaces", &self.namespaces),
            ("services", &self.services),
            ("workloads", &self.workloads),
        ];
        for (name, table) in traffic {
            if let Some((key, weight)) = table.iter().find(|(_, w)| **w > MAX_WEIGHT) {
                return Err(EngineError::InvalidConfig(format!(
                    "{} entry '{}' exceeds the maximum weight {}, got {}",
                    name, key, MAX_WEIGHT, weight
                )));
            }
        }
        if !is_positive(self.default_latency_baseline_ms) {
            return Err(EngineError::InvalidConfig(
                "default_latency_baseline_ms must be a positive finite number".to_string(),
            ));
        }
        Ok(())
    }
}

fn table(entries: &[(&str, f64)]) -> HashMap<String, f64> {
    entries
        .iter()
        .map(|(key, weight)| (key.to_string(), *weight))
        .collect()
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// `baseline + amplitude * sin(i * frequency)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillation {
    pub baseline: f64,
    pub amplitude: f64,
    pub frequency: f64,
}

impl Oscillation {
    pub const fn new(baseline: f64, amplitude: f64, frequency: f64) -> Self {
        Self {
            baseline,
            amplitude,
            frequency,
        }
    }

    /// Value at bucket index `i`
    pub fn at(&self, i: usize) -> f64 {
        self.baseline + self.amplitude * (i as f64 * self.frequency).sin()
    }

    fn is_finite(&self) -> bool {
        self.baseline.is_finite() && self.amplitude.is_finite() && self.frequency.is_finite()
    }
}

/// Closed-open interval `[low, high)` a draw is scaled into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    fn is_ordered(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low <= self.high
    }
}

/// Shape of every synthesized metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub requests: Oscillation,
    /// Multiplicative jitter on requests
    pub request_jitter: Band,
    /// Fraction of requests that fail
    pub error_fraction: Band,
    pub latency_amplitude_ms: f64,
    pub latency_frequency: f64,
    /// Additive jitter on latency
    pub latency_jitter_ms: Band,
    pub cpu: Oscillation,
    pub cpu_jitter: Band,
    pub memory: Oscillation,
    pub memory_jitter: Band,
    pub throughput_ratio: f64,
    pub throughput_jitter: Band,
    pub network_in: Oscillation,
    pub network_jitter: Band,
    pub network_out_ratio: f64,
    pub connections_ratio: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            requests: Oscillation::new(150.0, 100.0, 0.5),
            request_jitter: Band::new(0.8, 1.2),
            error_fraction: Band::new(0.005, 0.025),
            latency_amplitude_ms: 35.0,
            latency_frequency: 0.4,
            latency_jitter_ms: Band::new(-20.0, 20.0),
            cpu: Oscillation::new(30.0, 20.0, 0.3),
            cpu_jitter: Band::new(0.0, 10.0),
            memory: Oscillation::new(45.0, 15.0, 0.4),
            memory_jitter: Band::new(0.0, 8.0),
            throughput_ratio: 0.8,
            throughput_jitter: Band::new(0.0, 50.0),
            network_in: Oscillation::new(100.0, 40.0, 0.35),
            network_jitter: Band::new(0.0, 20.0),
            network_out_ratio: 0.8,
            connections_ratio: 0.1,
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> Result<()> {
        let oscillations = [
            ("requests", &self.requests),
            ("cpu", &self.cpu),
            ("memory", &self.memory),
            ("network_in", &self.network_in),
        ];
        for (name, osc) in oscillations {
            if !osc.is_finite() {
                return Err(EngineError::InvalidConfig(format!(
                    "{} oscillation must be finite",
                    name
                )));
            }
        }

        let bands = [
            ("request_jitter", &self.request_jitter),
            ("error_fraction", &self.error_fraction),
            ("latency_jitter_ms", &self.latency_jitter_ms),
            ("cpu_jitter", &self.cpu_jitter),
            ("memory_jitter", &self.memory_jitter),
            ("throughput_jitter", &self.throughput_jitter),
            ("network_jitter", &self.network_jitter),
        ];
        for (name, band) in bands {
            if !band.is_ordered() {
                return Err(EngineError::InvalidConfig(format!(
                    "{} band must be finite with low <= high",
                    name
                )));
            }
        }

        if self.error_fraction.low < 0.0 || self.error_fraction.high > 1.0 {
            return Err(EngineError::InvalidConfig(
                "error_fraction must stay within [0, 1]".to_string(),
            ));
        }
        if self.request_jitter.low < 0.0 {
            return Err(EngineError::InvalidConfig(
                "request_jitter must not be negative".to_string(),
            ));
        }

        let ratios = [
            ("latency_amplitude_ms", self.latency_amplitude_ms),
            ("latency_frequency", self.latency_frequency),
            ("throughput_ratio", self.throughput_ratio),
            ("network_out_ratio", self.network_out_ratio),
            ("connections_ratio", self.connections_ratio),
        ];
        for (name, value) in ratios {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{} must be a non-negative finite number",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Filter options a host can present; the engine itself accepts any value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub namespaces: Vec<String>,
    pub services: Vec<String>,
    pub workloads: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            namespaces: owned(&[
                crate::models::ALL_NAMESPACES,
                "default",
                "istio-system",
                "kube-system",
                "monitoring",
            ]),
            services: owned(&[
                crate::models::ALL_SERVICES,
                "productpage",
                "details",
                "ratings",
                "reviews",
                "bookinfo-gateway",
            ]),
            workloads: owned(&[
                crate::models::ALL_WORKLOADS,
                "reviews-v1",
                "reviews-v2",
                "reviews-v3",
                "productpage-v1",
                "details-v1",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_bucket_specs() {
        let config = EngineConfig::default();
        assert_eq!(
            config.bucket_spec(TimeRange::OneHour).unwrap(),
            BucketSpec::new(12, 5)
        );
        assert_eq!(
            config.bucket_spec(TimeRange::SixHours).unwrap(),
            BucketSpec::new(24, 15)
        );
        assert_eq!(
            config.bucket_spec(TimeRange::OneDay).unwrap(),
            BucketSpec::new(48, 30)
        );
        assert_eq!(
            config.bucket_spec(TimeRange::SevenDays).unwrap(),
            BucketSpec::new(96, 60)
        );
    }

    #[test]
    fn test_missing_range_is_invalid_argument() {
        let config = EngineConfig {
            ranges: vec![RangeEntry::new(TimeRange::OneHour, 12, 5)],
            ..EngineConfig::default()
        };
        let err = config.bucket_spec(TimeRange::SevenDays).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_non_positive_weight() {
        let mut config = EngineConfig::default();
        config.tables.namespaces.insert("broken".to_string(), 0.0);
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));

        let mut config = EngineConfig::default();
        config.tables.services.insert("nan".to_string(), f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_weight_upper_bound() {
        let mut config = EngineConfig::default();
        config.tables.workloads.insert("edge".to_string(), MAX_WEIGHT);
        assert!(config.validate().is_ok());

        config.tables.workloads.insert("huge".to_string(), 1e6);
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));

        // latency tiers are not traffic weights
        let mut config = EngineConfig::default();
        config
            .tables
            .latency_baselines_ms
            .insert("slow-v9".to_string(), 5_000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_bands_and_ranges() {
        let mut config = EngineConfig::default();
        config.generator.error_fraction = Band::new(0.5, 1.5);
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.generator.request_jitter = Band::new(1.2, 0.8);
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.ranges.push(RangeEntry::new(TimeRange::OneHour, 6, 10));
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.ranges[0].bucket_count = 0;
        assert!(config.validate().is_err());

        let config = EngineConfig {
            rollup_window: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "tables": { "namespaces": { "payments": 2.0 } },
            "rollup_window": 4
        }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.rollup_window, 4);
        assert_eq!(config.tables.namespaces.get("payments"), Some(&2.0));
        // Tables present in the file replace the default table wholesale
        assert!(!config.tables.namespaces.contains_key("istio-system"));
        assert_eq!(config.tables.services.get("productpage"), Some(&1.3));
        assert_eq!(config.ranges.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_oscillation_at_zero_is_baseline() {
        let osc = Oscillation::new(150.0, 100.0, 0.5);
        assert_eq!(osc.at(0), 150.0);
    }
}
