//! Output formatting utilities

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use sim_lib::status::Indicator;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Parse a stored format name, falling back to the table format
    pub fn parse_lossy(value: &str) -> Self {
        <Self as ValueEnum>::from_str(value, true).unwrap_or_default()
    }
}

/// Print a table from a list of items
pub fn print_table<T: Tabled>(items: &[T]) {
    if items.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(items).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a table whose headers are only known at runtime
pub fn print_dynamic_table(headers: Vec<String>, rows: Vec<Vec<String>>) {
    if rows.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(headers);
    for row in rows {
        builder.push_record(row);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a count with a k/M suffix
pub fn format_count(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        format!("{:.0}", value)
    }
}

/// Format a percentage with one decimal
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Format a latency in milliseconds
pub fn format_latency(ms: f64) -> String {
    format!("{:.0}ms", ms)
}

/// Color text according to a status indicator
pub fn color_indicator(text: &str, indicator: Indicator) -> ColoredString {
    match indicator {
        Indicator::Green => text.green(),
        Indicator::Yellow => text.yellow(),
        Indicator::Red => text.red(),
    }
}

/// Horizontal bar scaled against `max`
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max.is_nan() || max <= 0.0 || !value.is_finite() || value <= 0.0 {
        return String::new();
    }
    let filled = ((value / max).min(1.0) * width as f64).round() as usize;
    "█".repeat(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(950.0), "950");
        assert_eq!(format_count(12_400.0), "12.4k");
        assert_eq!(format_count(2_500_000.0), "2.5M");
    }

    #[test]
    fn test_output_format_parse_lossy() {
        assert_eq!(OutputFormat::parse_lossy("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse_lossy("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse_lossy("yaml"), OutputFormat::Table);
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(50.0, 100.0, 10).chars().count(), 5);
        assert_eq!(bar(200.0, 100.0, 10).chars().count(), 10);
        assert_eq!(bar(0.0, 100.0, 10), "");
        assert_eq!(bar(10.0, 0.0, 10), "");
    }
}
