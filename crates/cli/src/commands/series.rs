//! Series, summary and chart commands

use anyhow::Result;
use chrono::{DateTime, Local};
use colored::Colorize;
use serde::Serialize;
use sim_lib::{
    projector::{self, ChartProjection, DashboardView},
    status::StatusBoard,
    RollupSummary, SeriesTotals, Snapshot,
};
use tabled::Tabled;

use super::Session;
use crate::output::{
    bar, color_indicator, format_count, format_latency, format_percent, print_dynamic_table,
    print_json, print_table, OutputFormat,
};

const BAR_WIDTH: usize = 30;

/// Row for the series table
#[derive(Tabled)]
struct SampleRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Requests")]
    requests: u64,
    #[tabled(rename = "Errors")]
    errors: u64,
    #[tabled(rename = "Success")]
    success_rate: String,
    #[tabled(rename = "Latency")]
    latency: String,
    #[tabled(rename = "P95")]
    p95: String,
    #[tabled(rename = "P99")]
    p99: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Throughput")]
    throughput: u64,
    #[tabled(rename = "QPS")]
    qps: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryOutput<'a> {
    selection: &'a sim_lib::FilterSelection,
    range: sim_lib::TimeRange,
    multiplier: f64,
    summary: &'a RollupSummary,
    totals: &'a SeriesTotals,
    status: &'a StatusBoard,
}

/// Print the full generated series
pub fn show_series(session: &Session, format: OutputFormat) -> Result<()> {
    let snapshot = session.snapshot()?;

    match format {
        OutputFormat::Json => print_json(&snapshot)?,
        OutputFormat::Table => {
            print_header("Telemetry Series", &snapshot);
            let rows: Vec<SampleRow> = snapshot
                .series
                .iter()
                .map(|s| SampleRow {
                    time: s.time.clone(),
                    requests: s.requests,
                    errors: s.errors,
                    success_rate: format_percent(s.success_rate),
                    latency: format_latency(s.latency),
                    p95: format_latency(s.p95_latency),
                    p99: format_latency(s.p99_latency),
                    cpu: format_percent(s.cpu),
                    memory: format_percent(s.memory),
                    throughput: s.throughput,
                    qps: s.qps,
                })
                .collect();
            print_table(&rows);
        }
    }

    Ok(())
}

/// Print the rollup summary, KPI totals and status indicators
pub fn show_summary(session: &Session, format: OutputFormat) -> Result<()> {
    let snapshot = session.snapshot()?;

    match format {
        OutputFormat::Json => print_json(&SummaryOutput {
            selection: &snapshot.selection,
            range: snapshot.range,
            multiplier: snapshot.multiplier,
            summary: &snapshot.summary,
            totals: &snapshot.totals,
            status: &snapshot.status,
        })?,
        OutputFormat::Table => {
            print_header("Service Summary", &snapshot);
            let summary = &snapshot.summary;
            let status = &snapshot.status;

            println!(
                "{}  (last {} buckets)",
                "Rolling Window".bold(),
                summary.window_len
            );
            println!("{}", "-".repeat(50));
            let health = format!(
                "{}/{}",
                summary.service_health.current, summary.service_health.total
            );
            println!(
                "Service Health:         {}",
                color_indicator(&health, status.health).bold()
            );
            println!(
                "Error Rate:             {}",
                color_indicator(&format_percent(summary.error_rate_percent), status.error_rate)
            );
            println!(
                "Avg Latency:            {}",
                color_indicator(&format_latency(summary.avg_latency_ms), status.latency)
            );
            println!(
                "Throughput:             {}/min",
                format_count(summary.throughput_per_min)
            );
            println!(
                "CPU:                    {}",
                color_indicator(&format_percent(summary.avg_cpu_percent), status.cpu)
            );
            println!(
                "Memory:                 {}",
                color_indicator(&format_percent(summary.avg_memory_percent), status.memory)
            );
            println!(
                "Uptime:                 {}",
                format_percent(summary.uptime_percent)
            );
            println!();

            let totals = &snapshot.totals;
            println!("{}", "Series Totals".bold());
            println!("{}", "-".repeat(50));
            println!(
                "Total Requests:         {}",
                format_count(totals.total_requests as f64)
            );
            println!(
                "Total Errors:           {}",
                format_count(totals.total_errors as f64)
            );
            println!(
                "Error Rate:             {}",
                format_percent(totals.error_rate_percent)
            );
            println!(
                "Avg Latency:            {}",
                format_latency(totals.avg_latency_ms)
            );
            println!(
                "Total Throughput:       {}",
                format_count(totals.total_throughput as f64)
            );
            println!();

            println!(
                "{} {}",
                "Overall:".bold(),
                color_indicator(status.overall.as_str(), status.overall).bold()
            );
        }
    }

    Ok(())
}

/// Print the projection for a metric selector
pub fn show_chart(session: &Session, metric: &str, format: OutputFormat) -> Result<()> {
    let snapshot = session.snapshot()?;
    let projection = projector::project(&snapshot.series, metric);
    render_projection(&snapshot, &projection, format)
}

/// Print the projection for a dashboard tab
pub fn show_view(session: &Session, view: &str, format: OutputFormat) -> Result<()> {
    let snapshot = session.snapshot()?;
    let projection = projector::project_view(&snapshot.series, DashboardView::parse_lossy(view));
    render_projection(&snapshot, &projection, format)
}

fn render_projection(
    snapshot: &Snapshot,
    projection: &ChartProjection,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(projection)?,
        OutputFormat::Table => {
            print_header(&format!("Chart: {}", projection.key), snapshot);

            let max = projection
                .points
                .iter()
                .map(|p| p.primary)
                .fold(0.0_f64, f64::max);

            let headers = vec![
                "Time".to_string(),
                projection.primary_name.to_string(),
                projection.secondary_name.to_string(),
                String::new(),
            ];
            let rows = projection
                .points
                .iter()
                .map(|p| {
                    vec![
                        p.time.clone(),
                        format_value(p.primary),
                        format_value(p.secondary),
                        bar(p.primary, max, BAR_WIDTH).cyan().to_string(),
                    ]
                })
                .collect();
            print_dynamic_table(headers, rows);
        }
    }

    Ok(())
}

fn print_header(title: &str, snapshot: &Snapshot) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
    println!("Namespace:              {}", snapshot.selection.namespace.cyan());
    println!("Service:                {}", snapshot.selection.service.cyan());
    println!("Workload:               {}", snapshot.selection.workload.cyan());
    println!(
        "Range:                  {} ({} x {}m)",
        snapshot.range,
        snapshot.bucket_spec.bucket_count,
        snapshot.bucket_spec.bucket_minutes
    );
    println!("Multiplier:             {:.2}", snapshot.multiplier);
    println!(
        "Generated:              {}",
        format_timestamp(snapshot.generated_at).dimmed()
    );
    println!();
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Format an epoch-millisecond timestamp in local time
fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| millis.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(150.0), "150");
        assert_eq!(format_value(98.66), "98.7");
    }

    #[test]
    fn test_format_timestamp_falls_back_on_out_of_range() {
        assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
        assert!(format_timestamp(1_705_309_200_000).starts_with("2024-01-1"));
    }
}
