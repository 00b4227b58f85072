//! Synthetic time series generation
//!
//! Builds one [`MetricSample`] per bucket from seasonal oscillations,
//! bounded jitter drawn from an injected [`RandomSource`] and a handful of
//! derived ratios. Labels are wall-clock `HH:MM` values counted back from
//! an anchor instant, so bucket `count - 1` ends at the anchor.

use crate::config::{Band, GeneratorConfig};
use crate::models::{round1, BucketSpec, MetricSample, Series};
use crate::random::RandomSource;
use crate::resolver::GenerationProfile;
use chrono::{DateTime, Duration, Utc};

/// p95 latency as a multiple of mean latency
pub const P95_FACTOR: f64 = 1.5;

/// p99 latency as a multiple of mean latency
pub const P99_FACTOR: f64 = 2.1;

/// Synthesizes complete series from a profile and bucket layout
#[derive(Debug, Clone, Default)]
pub struct SeriesGenerator {
    config: GeneratorConfig,
}

impl SeriesGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate `spec.bucket_count` samples ending at `anchor`
    ///
    /// Each bucket consumes exactly seven draws from `rng`, in a fixed
    /// order, so a seeded source always yields the same series.
    pub fn generate(
        &self,
        profile: GenerationProfile,
        spec: BucketSpec,
        anchor: DateTime<Utc>,
        rng: &mut dyn RandomSource,
    ) -> Series {
        let samples = (0..spec.bucket_count)
            .map(|i| {
                let back = (spec.bucket_count - i) as i64 * spec.bucket_minutes as i64;
                let start = anchor - Duration::minutes(back);
                self.sample(i, start, profile, &mut *rng)
            })
            .collect();
        Series::from_samples(samples)
    }

    fn sample(
        &self,
        i: usize,
        start: DateTime<Utc>,
        profile: GenerationProfile,
        rng: &mut dyn RandomSource,
    ) -> MetricSample {
        let cfg = &self.config;

        let request_jitter = draw(rng, cfg.request_jitter);
        let requests = non_negative_count(cfg.requests.at(i) * profile.multiplier * request_jitter);

        let error_fraction = draw(rng, cfg.error_fraction);
        let errors = non_negative_count(requests as f64 * error_fraction).min(requests);

        let latency_wave = cfg.latency_amplitude_ms * (i as f64 * cfg.latency_frequency).sin();
        let latency_jitter = draw(rng, cfg.latency_jitter_ms);
        let latency = (profile.latency_baseline_ms + latency_wave + latency_jitter)
            .round()
            .max(0.0);

        let cpu = percentage(cfg.cpu.at(i) + draw(rng, cfg.cpu_jitter));
        let memory = percentage(cfg.memory.at(i) + draw(rng, cfg.memory_jitter));

        let throughput =
            non_negative_count(requests as f64 * cfg.throughput_ratio + draw(rng, cfg.throughput_jitter));

        let network_in = round1((cfg.network_in.at(i) + draw(rng, cfg.network_jitter)).max(0.0));
        let network_out = round1(network_in * cfg.network_out_ratio);

        MetricSample {
            time: start.format("%H:%M").to_string(),
            timestamp: start.timestamp_millis(),
            requests,
            errors,
            latency,
            cpu,
            memory,
            throughput,
            network_in,
            network_out,
            success_rate: success_rate(requests, errors),
            p95_latency: latency * P95_FACTOR,
            p99_latency: latency * P99_FACTOR,
            active_connections: non_negative_count(requests as f64 * cfg.connections_ratio),
            qps: non_negative_count(throughput as f64 / 60.0),
        }
    }
}

/// Share of successful requests, one decimal, 0 without traffic
pub fn success_rate(requests: u64, errors: u64) -> f64 {
    if requests == 0 {
        return 0.0;
    }
    round1(requests.saturating_sub(errors) as f64 / requests as f64 * 100.0)
}

fn draw(rng: &mut dyn RandomSource, band: Band) -> f64 {
    rng.uniform(band.low, band.high)
}

// NaN and negatives collapse to zero
fn non_negative_count(value: f64) -> u64 {
    let rounded = value.round();
    if rounded.is_finite() && rounded > 0.0 {
        rounded as u64
    } else {
        0
    }
}

fn percentage(value: f64) -> f64 {
    let rounded = value.round();
    if rounded.is_finite() {
        rounded.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Oscillation, RangeEntry};
    use crate::models::TimeRange;
    use crate::random::{SeededSource, SequenceSource};
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn neutral() -> GenerationProfile {
        GenerationProfile {
            multiplier: 1.0,
            latency_baseline_ms: 160.0,
        }
    }

    fn generate_range(range: TimeRange, seed: u64) -> Series {
        let entry = crate::config::EngineConfig::default()
            .ranges
            .into_iter()
            .find(|e: &RangeEntry| e.range == range)
            .unwrap();
        SeriesGenerator::default().generate(
            neutral(),
            entry.spec(),
            anchor(),
            &mut SeededSource::new(seed),
        )
    }

    #[test]
    fn test_length_matches_bucket_count() {
        let expected = [
            (TimeRange::OneHour, 12),
            (TimeRange::SixHours, 24),
            (TimeRange::OneDay, 48),
            (TimeRange::SevenDays, 96),
        ];
        for (range, count) in expected {
            assert_eq!(generate_range(range, 7).len(), count, "range {}", range);
        }
    }

    #[test]
    fn test_sample_invariants_hold_for_many_seeds() {
        for seed in 0..50 {
            let series = generate_range(TimeRange::SevenDays, seed);
            for s in series.iter() {
                assert!(s.errors <= s.requests);
                if s.requests > 0 {
                    let expected =
                        round1((s.requests - s.errors) as f64 / s.requests as f64 * 100.0);
                    assert_eq!(s.success_rate, expected);
                }
                assert_eq!(s.p95_latency, 1.5 * s.latency);
                assert_eq!(s.p99_latency, 2.1 * s.latency);
                assert!((0.0..=100.0).contains(&s.cpu));
                assert!((0.0..=100.0).contains(&s.memory));
                assert!(s.latency >= 0.0);
                assert!(s.network_in >= 0.0 && s.network_out >= 0.0);
                assert!((0.0..=100.0).contains(&s.success_rate));
            }
        }
    }

    #[test]
    fn test_timestamps_strictly_ascending() {
        let series = generate_range(TimeRange::OneDay, 3);
        for pair in series.samples().windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn test_wall_clock_labels() {
        let series = generate_range(TimeRange::OneHour, 1);
        // 12 buckets of 5 minutes ending at 12:00
        assert_eq!(series.samples()[0].time, "11:00");
        assert_eq!(series.samples()[11].time, "11:55");
        assert_eq!(
            series.samples()[11].timestamp,
            anchor().timestamp_millis() - 5 * 60 * 1000
        );
    }

    #[test]
    fn test_same_seed_same_series() {
        assert_eq!(
            generate_range(TimeRange::SixHours, 99),
            generate_range(TimeRange::SixHours, 99)
        );
    }

    #[test]
    fn test_exact_values_with_midpoint_draws() {
        let series = SeriesGenerator::default().generate(
            neutral(),
            BucketSpec::new(1, 5),
            anchor(),
            &mut SequenceSource::constant(0.5),
        );
        let s = &series.samples()[0];
        assert_eq!(s.requests, 150);
        assert_eq!(s.errors, 2);
        assert_eq!(s.latency, 160.0);
        assert_eq!(s.cpu, 35.0);
        assert_eq!(s.memory, 49.0);
        assert_eq!(s.throughput, 145);
        assert_eq!(s.network_in, 110.0);
        assert_eq!(s.network_out, 88.0);
        assert_eq!(s.success_rate, 98.7);
        assert_eq!(s.active_connections, 15);
        assert_eq!(s.qps, 2);
    }

    #[test]
    fn test_multiplier_scales_requests() {
        let generator = SeriesGenerator::default();
        let base = generator.generate(
            neutral(),
            BucketSpec::new(12, 5),
            anchor(),
            &mut SequenceSource::constant(0.5),
        );
        let scaled = generator.generate(
            GenerationProfile {
                multiplier: 2.0,
                ..neutral()
            },
            BucketSpec::new(12, 5),
            anchor(),
            &mut SequenceSource::constant(0.5),
        );
        let base_total: u64 = base.iter().map(|s| s.requests).sum();
        let scaled_total: u64 = scaled.iter().map(|s| s.requests).sum();
        assert!(scaled_total > base_total * 19 / 10);
    }

    #[test]
    fn test_zero_traffic_success_rate_fallback() {
        let config = GeneratorConfig {
            requests: Oscillation::new(0.0, 0.0, 0.0),
            ..GeneratorConfig::default()
        };
        let series = SeriesGenerator::new(config).generate(
            neutral(),
            BucketSpec::new(4, 5),
            anchor(),
            &mut SeededSource::new(5),
        );
        for s in series.iter() {
            assert_eq!(s.requests, 0);
            assert_eq!(s.errors, 0);
            assert_eq!(s.success_rate, 0.0);
            assert!(s.success_rate.is_finite());
        }
    }

    #[test]
    fn test_cpu_clamped_under_extreme_baseline() {
        let config = GeneratorConfig {
            cpu: Oscillation::new(500.0, 0.0, 0.0),
            memory: Oscillation::new(-50.0, 0.0, 0.0),
            ..GeneratorConfig::default()
        };
        let series = SeriesGenerator::new(config).generate(
            neutral(),
            BucketSpec::new(6, 5),
            anchor(),
            &mut SeededSource::new(11),
        );
        for s in series.iter() {
            assert_eq!(s.cpu, 100.0);
            assert_eq!(s.memory, 0.0);
        }
    }

    #[test]
    fn test_success_rate_helper() {
        assert_eq!(success_rate(0, 0), 0.0);
        assert_eq!(success_rate(1000, 5), 99.5);
        assert_eq!(success_rate(10, 10), 0.0);
    }
}
