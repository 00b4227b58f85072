//! Catalog command

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use sim_lib::{
    config::{Catalog, RangeEntry},
    projector::{DashboardView, MetricKey},
    TelemetryEngine,
};
use tabled::Tabled;

use crate::output::{print_json, print_table, OutputFormat};

/// Row for the range table
#[derive(Tabled)]
struct RangeRow {
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "Buckets")]
    bucket_count: usize,
    #[tabled(rename = "Bucket Width")]
    bucket_width: String,
}

#[derive(Serialize)]
struct CatalogOutput<'a> {
    #[serde(flatten)]
    catalog: &'a Catalog,
    ranges: &'a [RangeEntry],
    metrics: Vec<&'static str>,
    views: Vec<&'static str>,
}

const VIEWS: [DashboardView; 3] = [
    DashboardView::Overview,
    DashboardView::Resources,
    DashboardView::Performance,
];

/// Show the filter options, ranges and selectors the engine understands
pub fn show_catalog(engine: &TelemetryEngine, format: OutputFormat) -> Result<()> {
    let config = engine.config();
    let metrics: Vec<&'static str> = MetricKey::ALL.iter().map(|k| k.as_str()).collect();
    let views: Vec<&'static str> = VIEWS.iter().map(|v| v.as_str()).collect();

    match format {
        OutputFormat::Json => print_json(&CatalogOutput {
            catalog: &config.catalog,
            ranges: &config.ranges,
            metrics,
            views,
        })?,
        OutputFormat::Table => {
            println!("{}", "Catalog".bold());
            println!("{}", "=".repeat(50));
            print_list("Namespaces", &config.catalog.namespaces);
            print_list("Services", &config.catalog.services);
            print_list("Workloads", &config.catalog.workloads);
            println!("{:<24}{}", "Metrics:", metrics.join(", "));
            println!("{:<24}{}", "Views:", views.join(", "));
            println!();

            let rows: Vec<RangeRow> = config
                .ranges
                .iter()
                .map(|r| RangeRow {
                    range: r.range.to_string(),
                    bucket_count: r.bucket_count,
                    bucket_width: format!("{}m", r.bucket_minutes),
                })
                .collect();
            print_table(&rows);
        }
    }

    Ok(())
}

fn print_list(label: &str, items: &[String]) {
    let highlighted: Vec<String> = items.iter().map(|i| i.cyan().to_string()).collect();
    println!("{:<24}{}", format!("{}:", label), highlighted.join(", "));
}
