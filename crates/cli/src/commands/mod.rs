//! CLI subcommands

pub mod catalog;
pub mod series;
pub mod settings;

use anyhow::{Context, Result};
use sim_lib::{
    EntropySource, FilterSelection, RandomSource, SeededSource, Snapshot, TelemetryEngine,
    TimeRange,
};
use tracing::debug;

/// Resolved inputs for one regeneration
pub struct Session {
    pub engine: TelemetryEngine,
    pub selection: FilterSelection,
    pub range: TimeRange,
    pub seed: Option<u64>,
}

impl Session {
    /// Generate a snapshot for the session's selection and range
    pub fn snapshot(&self) -> Result<Snapshot> {
        debug!(
            selection = %self.selection,
            range = %self.range,
            seed = ?self.seed,
            "Generating snapshot"
        );

        let mut rng: Box<dyn RandomSource> = match self.seed {
            Some(seed) => Box::new(SeededSource::new(seed)),
            None => Box::new(EntropySource::new()),
        };

        self.engine
            .regenerate_now(&self.selection, self.range, rng.as_mut())
            .context("Failed to generate telemetry")
    }
}
