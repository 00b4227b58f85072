//! Regeneration pipeline and snapshot adoption
//!
//! [`TelemetryEngine`] runs resolver, generator, aggregator and status
//! board in one call. [`SnapshotStore`] lets a host with overlapping
//! regenerations adopt only the result of the most recent request.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::generator::SeriesGenerator;
use crate::models::{BucketSpec, FilterSelection, RollupSummary, Series, SeriesTotals, TimeRange};
use crate::observability::{EngineMetrics, StructuredLogger};
use crate::random::RandomSource;
use crate::resolver::MultiplierResolver;
use crate::rollup::{self, RollupAggregator};
use crate::status::StatusBoard;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// Full output of one regeneration cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub selection: FilterSelection,
    pub range: TimeRange,
    pub bucket_spec: BucketSpec,
    pub multiplier: f64,
    pub series: Series,
    pub summary: RollupSummary,
    pub totals: SeriesTotals,
    pub status: StatusBoard,
    /// Anchor instant, milliseconds since the Unix epoch
    pub generated_at: i64,
}

/// Stateless regeneration pipeline
#[derive(Debug, Clone)]
pub struct TelemetryEngine {
    config: EngineConfig,
    resolver: MultiplierResolver,
    generator: SeriesGenerator,
    aggregator: RollupAggregator,
    metrics: EngineMetrics,
    logger: StructuredLogger,
}

impl TelemetryEngine {
    /// Build an engine from validated configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            resolver: MultiplierResolver::new(config.tables.clone()),
            generator: SeriesGenerator::new(config.generator.clone()),
            aggregator: RollupAggregator::new(config.rollup_window),
            metrics: EngineMetrics::new(),
            logger: StructuredLogger::new("engine"),
            config,
        })
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &MultiplierResolver {
        &self.resolver
    }

    pub fn bucket_spec(&self, range: TimeRange) -> Result<BucketSpec> {
        self.config.bucket_spec(range)
    }

    /// Regenerate the series and summary for a selection, anchored at `anchor`
    pub fn regenerate(
        &self,
        selection: &FilterSelection,
        range: TimeRange,
        anchor: DateTime<Utc>,
        rng: &mut dyn RandomSource,
    ) -> Result<Snapshot> {
        let started = Instant::now();
        let spec = self.bucket_spec(range)?;
        let profile = self.resolver.profile(selection);

        let series = self.generator.generate(profile, spec, anchor, rng);
        let summary = self.aggregator.aggregate(&series);
        let totals = rollup::totals(&series);
        let status = StatusBoard::from_summary(&summary, &self.config.thresholds);

        let elapsed = started.elapsed();
        self.metrics.observe_regeneration(
            elapsed.as_secs_f64(),
            series.len(),
            summary.service_health.current,
        );
        self.logger.log_regeneration(
            &selection.namespace,
            &selection.service,
            &selection.workload,
            range.as_str(),
            series.len(),
            profile.multiplier,
            summary.service_health.current,
            summary.error_rate_percent,
            elapsed.as_micros() as u64,
        );

        Ok(Snapshot {
            selection: selection.clone(),
            range,
            bucket_spec: spec,
            multiplier: profile.multiplier,
            series,
            summary,
            totals,
            status,
            generated_at: anchor.timestamp_millis(),
        })
    }

    /// Regenerate anchored at the current wall-clock time
    pub fn regenerate_now(
        &self,
        selection: &FilterSelection,
        range: TimeRange,
        rng: &mut dyn RandomSource,
    ) -> Result<Snapshot> {
        self.regenerate(selection, range, Utc::now(), rng)
    }
}

/// Handle for one in-flight regeneration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Holds the adopted snapshot; newest request wins
#[derive(Debug)]
pub struct SnapshotStore {
    issued: AtomicU64,
    current: RwLock<Option<Adopted>>,
    metrics: EngineMetrics,
    logger: StructuredLogger,
}

#[derive(Debug)]
struct Adopted {
    generation: u64,
    snapshot: Arc<Snapshot>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            current: RwLock::new(None),
            metrics: EngineMetrics::new(),
            logger: StructuredLogger::new("snapshot-store"),
        }
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Register a new regeneration; supersedes every earlier ticket
    pub fn begin(&self) -> Ticket {
        Ticket {
            generation: self.issued.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    /// Adopt `snapshot` if `ticket` is still the newest one issued
    ///
    /// Returns false when the result was discarded.
    pub fn commit(&self, ticket: Ticket, snapshot: Snapshot) -> bool {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());

        let latest = self.issued.load(Ordering::SeqCst);
        let adopted = current.as_ref().map(|a| a.generation).unwrap_or(0);
        if ticket.generation != latest || ticket.generation <= adopted {
            self.metrics.inc_stale_results_discarded();
            self.logger.log_stale_snapshot(ticket.generation, latest);
            return false;
        }

        *current = Some(Adopted {
            generation: ticket.generation,
            snapshot: Arc::new(snapshot),
        });
        true
    }

    /// Currently adopted snapshot, if any
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|a| Arc::clone(&a.snapshot))
    }

    /// Generation of the currently adopted snapshot (0 when none)
    pub fn adopted_generation(&self) -> u64 {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|a| a.generation)
            .unwrap_or(0)
    }
}
