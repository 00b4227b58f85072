//! Status indicators derived from a rollup summary
//!
//! Each card on the dashboard shows a traffic-light indicator. The board
//! also carries an overall status, which is the worst of its indicators.

use crate::models::RollupSummary;
use serde::{Deserialize, Serialize};

/// Traffic-light status of a single indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Green,
    Yellow,
    Red,
}

impl Indicator {
    /// Returns true unless the indicator is red
    pub fn is_operational(&self) -> bool {
        matches!(self, Indicator::Green | Indicator::Yellow)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::Green => "green",
            Indicator::Yellow => "yellow",
            Indicator::Red => "red",
        }
    }
}

/// Thresholds behind the indicators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorThresholds {
    /// Error rate (percent) above which the error card turns red
    pub error_rate_red_percent: f64,
    /// Average latency (ms) above which the latency card turns yellow
    pub latency_yellow_ms: f64,
    /// Health score below which a degraded service turns red instead of yellow
    pub health_red_below: u8,
    /// Utilisation (percent) above which a resource gauge turns yellow
    pub utilisation_yellow_percent: f64,
    /// Utilisation (percent) above which a resource gauge turns red
    pub utilisation_red_percent: f64,
}

impl Default for IndicatorThresholds {
    fn default() -> Self {
        Self {
            error_rate_red_percent: 1.5,
            latency_yellow_ms: 200.0,
            health_red_below: 3,
            utilisation_yellow_percent: 60.0,
            utilisation_red_percent: 80.0,
        }
    }
}

/// Indicators for one summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBoard {
    pub health: Indicator,
    pub error_rate: Indicator,
    pub latency: Indicator,
    pub cpu: Indicator,
    pub memory: Indicator,
    pub overall: Indicator,
}

impl StatusBoard {
    pub fn from_summary(summary: &RollupSummary, thresholds: &IndicatorThresholds) -> Self {
        let health = health_indicator(summary, thresholds);
        let error_rate = if summary.error_rate_percent > thresholds.error_rate_red_percent {
            Indicator::Red
        } else {
            Indicator::Green
        };
        let latency = if summary.avg_latency_ms > thresholds.latency_yellow_ms {
            Indicator::Yellow
        } else {
            Indicator::Green
        };
        let cpu = utilisation_indicator(summary.avg_cpu_percent, thresholds);
        let memory = utilisation_indicator(summary.avg_memory_percent, thresholds);

        Self {
            health,
            error_rate,
            latency,
            cpu,
            memory,
            overall: worst(&[health, error_rate, latency, cpu, memory]),
        }
    }
}

fn health_indicator(summary: &RollupSummary, thresholds: &IndicatorThresholds) -> Indicator {
    let health = summary.service_health;
    if health.current >= health.total {
        Indicator::Green
    } else if health.current < thresholds.health_red_below {
        Indicator::Red
    } else {
        Indicator::Yellow
    }
}

/// Indicator for a used/total percentage gauge
pub fn utilisation_indicator(percent: f64, thresholds: &IndicatorThresholds) -> Indicator {
    if percent > thresholds.utilisation_red_percent {
        Indicator::Red
    } else if percent > thresholds.utilisation_yellow_percent {
        Indicator::Yellow
    } else {
        Indicator::Green
    }
}

/// Worst of a set of indicators; green when empty
pub fn worst(indicators: &[Indicator]) -> Indicator {
    indicators.iter().copied().max().unwrap_or(Indicator::Green)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceHealth;

    fn summary(health: u8, error_rate: f64, latency: f64, cpu: f64, memory: f64) -> RollupSummary {
        RollupSummary {
            service_health: ServiceHealth {
                current: health,
                total: 5,
            },
            error_rate_percent: error_rate,
            avg_latency_ms: latency,
            throughput_per_min: 100.0,
            avg_cpu_percent: cpu,
            avg_memory_percent: memory,
            uptime_percent: 100.0,
            window_len: 6,
        }
    }

    #[test]
    fn test_all_green() {
        let board = StatusBoard::from_summary(
            &summary(5, 0.5, 150.0, 30.0, 45.0),
            &IndicatorThresholds::default(),
        );
        assert_eq!(board.overall, Indicator::Green);
        assert!(board.overall.is_operational());
    }

    #[test]
    fn test_health_indicator_tiers() {
        let t = IndicatorThresholds::default();
        assert_eq!(
            StatusBoard::from_summary(&summary(4, 0.5, 150.0, 30.0, 45.0), &t).health,
            Indicator::Yellow
        );
        assert_eq!(
            StatusBoard::from_summary(&summary(3, 0.5, 150.0, 30.0, 45.0), &t).health,
            Indicator::Yellow
        );
        assert_eq!(
            StatusBoard::from_summary(&summary(2, 0.5, 150.0, 30.0, 45.0), &t).health,
            Indicator::Red
        );
    }

    #[test]
    fn test_error_and_latency_indicators() {
        let t = IndicatorThresholds::default();
        let board = StatusBoard::from_summary(&summary(4, 1.6, 250.0, 30.0, 45.0), &t);
        assert_eq!(board.error_rate, Indicator::Red);
        assert_eq!(board.latency, Indicator::Yellow);
        assert_eq!(board.overall, Indicator::Red);
        assert!(!board.overall.is_operational());

        let board = StatusBoard::from_summary(&summary(5, 1.5, 200.0, 30.0, 45.0), &t);
        assert_eq!(board.error_rate, Indicator::Green);
        assert_eq!(board.latency, Indicator::Green);
    }

    #[test]
    fn test_utilisation_indicator() {
        let t = IndicatorThresholds::default();
        assert_eq!(utilisation_indicator(45.0, &t), Indicator::Green);
        assert_eq!(utilisation_indicator(60.0, &t), Indicator::Green);
        assert_eq!(utilisation_indicator(65.0, &t), Indicator::Yellow);
        assert_eq!(utilisation_indicator(80.5, &t), Indicator::Red);
    }

    #[test]
    fn test_worst() {
        assert_eq!(worst(&[]), Indicator::Green);
        assert_eq!(worst(&[Indicator::Green, Indicator::Yellow]), Indicator::Yellow);
        assert_eq!(
            worst(&[Indicator::Red, Indicator::Yellow, Indicator::Green]),
            Indicator::Red
        );
    }
}
