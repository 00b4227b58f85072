//! Simulation library for mesh telemetry dashboards
//!
//! This crate provides the core functionality for:
//! - Resolving filter selections into scaling weights
//! - Synthesizing bucketed multi-metric time series
//! - Rolling summaries, health scoring and status indicators
//! - Chart projections for metric selectors
//! - Observability of the regeneration cycle

pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod models;
pub mod observability;
pub mod projector;
pub mod random;
pub mod resolver;
pub mod rollup;
pub mod status;

pub use config::{EngineConfig, GeneratorConfig, RangeEntry, WeightTables};
pub use engine::{Snapshot, SnapshotStore, TelemetryEngine, Ticket};
pub use error::{EngineError, Result};
pub use models::*;
pub use observability::{EngineMetrics, StructuredLogger};
pub use random::{EntropySource, RandomSource, SeededSource, SequenceSource};
