//! Mesh Telemetry Simulator CLI
//!
//! Generates synthetic service-mesh telemetry for a filter selection and
//! prints series, rolling summaries and chart projections.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{catalog, series, settings, Session};
use sim_lib::{FilterSelection, TelemetryEngine, TimeRange};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Mesh Telemetry Simulator CLI
#[derive(Parser)]
#[command(name = "meshsim")]
#[command(author, version, about = "CLI for the Mesh Telemetry Simulator", long_about = None)]
pub struct Cli {
    /// Namespace filter (defaults to "All Namespaces")
    #[arg(long, short, global = true, env = "MESHSIM_NAMESPACE")]
    pub namespace: Option<String>,

    /// Service filter (defaults to "All Services")
    #[arg(long, short, global = true, env = "MESHSIM_SERVICE")]
    pub service: Option<String>,

    /// Workload filter (defaults to "All Workloads")
    #[arg(long, short, global = true, env = "MESHSIM_WORKLOAD")]
    pub workload: Option<String>,

    /// Time range (1h, 6h, 24h, 7d)
    #[arg(long, short, global = true, env = "MESHSIM_RANGE")]
    pub range: Option<String>,

    /// Seed for reproducible output
    #[arg(long, global = true, env = "MESHSIM_SEED")]
    pub seed: Option<u64>,

    /// Engine configuration file (JSON) overriding weight tables and ranges
    #[arg(long, global = true, env = "MESHSIM_ENGINE_CONFIG")]
    pub engine_config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the generated time series
    Series,

    /// Show the rolling summary, totals and status indicators
    Summary,

    /// Show a chart projection for a metric selector
    Chart {
        /// Metric selector (requests, errors, latency, throughput)
        #[arg(long, short, default_value = "requests")]
        metric: String,
    },

    /// Show a dashboard tab projection
    View {
        /// Dashboard tab (overview, resources, performance)
        #[arg(default_value = "overview")]
        view: String,
    },

    /// List filter options, ranges and selectors
    Catalog,

    /// Manage stored CLI defaults
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show stored defaults
    Show,

    /// Store defaults; the global filter, range, seed and format flags are saved
    Set {
        /// Forget the stored seed
        #[arg(long)]
        clear_seed: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn build_engine(cli: &Cli, defaults: &config::Config) -> Result<TelemetryEngine> {
    let engine_config = match &cli.engine_config {
        Some(path) => config::load_engine_config(path)?,
        None => defaults.engine.clone().unwrap_or_default(),
    };
    TelemetryEngine::new(engine_config).context("Invalid engine configuration")
}

/// Build a session from flags, falling back to stored defaults
fn build_session(cli: &Cli, defaults: &config::Config) -> Result<Session> {
    let engine = build_engine(cli, defaults)?;

    let fallback = FilterSelection::default();
    let pick = |flag: &Option<String>, stored: &Option<String>, sentinel: String| {
        flag.clone().or_else(|| stored.clone()).unwrap_or(sentinel)
    };
    let selection = FilterSelection::new(
        pick(&cli.namespace, &defaults.default_namespace, fallback.namespace),
        pick(&cli.service, &defaults.default_service, fallback.service),
        pick(&cli.workload, &defaults.default_workload, fallback.workload),
    );

    let range = match cli.range.as_ref().or(defaults.default_range.as_ref()) {
        Some(text) => text.parse::<TimeRange>()?,
        None => TimeRange::default(),
    };

    Ok(Session {
        engine,
        selection,
        range,
        seed: cli.seed.or(defaults.seed),
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let defaults = config::Config::load()?;
    let format = cli.format.unwrap_or_else(|| {
        defaults
            .default_format
            .as_deref()
            .map(output::OutputFormat::parse_lossy)
            .unwrap_or_default()
    });

    match &cli.command {
        Commands::Series => {
            series::show_series(&build_session(&cli, &defaults)?, format)?;
        }
        Commands::Summary => {
            series::show_summary(&build_session(&cli, &defaults)?, format)?;
        }
        Commands::Chart { metric } => {
            series::show_chart(&build_session(&cli, &defaults)?, metric, format)?;
        }
        Commands::View { view } => {
            series::show_view(&build_session(&cli, &defaults)?, view, format)?;
        }
        Commands::Catalog => {
            catalog::show_catalog(&build_engine(&cli, &defaults)?, format)?;
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Show => {
                settings::show_config(format)?;
            }
            ConfigCommands::Set { clear_seed } => {
                settings::set_config(settings::DefaultsUpdate {
                    namespace: cli.namespace.clone(),
                    service: cli.service.clone(),
                    workload: cli.workload.clone(),
                    range: cli.range.clone(),
                    format: cli.format,
                    seed: cli.seed,
                    clear_seed: *clear_seed,
                })?;
            }
        },
    }

    Ok(())
}
