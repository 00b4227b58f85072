//! Filter dimension weighting
//!
//! Each dimension of a [`FilterSelection`] is looked up in its own table.
//! Unmapped values, including the "All ..." sentinels, fall back to the
//! neutral weight. The composite multiplier is the product of the three.

use crate::config::{WeightTables, NEUTRAL_WEIGHT};
use crate::models::FilterSelection;
use std::collections::HashMap;

/// Scaling inputs for one generation run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationProfile {
    pub multiplier: f64,
    pub latency_baseline_ms: f64,
}

/// Resolves filter values into weights using injected tables
#[derive(Debug, Clone)]
pub struct MultiplierResolver {
    tables: WeightTables,
}

impl MultiplierResolver {
    pub fn new(tables: WeightTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &WeightTables {
        &self.tables
    }

    pub fn namespace_weight(&self, namespace: &str) -> f64 {
        weight(&self.tables.namespaces, namespace)
    }

    pub fn service_weight(&self, service: &str) -> f64 {
        weight(&self.tables.services, service)
    }

    pub fn workload_weight(&self, workload: &str) -> f64 {
        weight(&self.tables.workloads, workload)
    }

    /// Composite multiplier for a filter triple
    pub fn resolve(&self, namespace: &str, service: &str, workload: &str) -> f64 {
        self.namespace_weight(namespace) * self.service_weight(service) * self.workload_weight(workload)
    }

    /// Latency tier of a workload in milliseconds
    pub fn latency_baseline(&self, workload: &str) -> f64 {
        self.tables
            .latency_baselines_ms
            .get(workload)
            .copied()
            .unwrap_or(self.tables.default_latency_baseline_ms)
    }

    pub fn profile(&self, selection: &FilterSelection) -> GenerationProfile {
        GenerationProfile {
            multiplier: self.resolve(&selection.namespace, &selection.service, &selection.workload),
            latency_baseline_ms: self.latency_baseline(&selection.workload),
        }
    }
}

impl Default for MultiplierResolver {
    fn default() -> Self {
        Self::new(WeightTables::default())
    }
}

fn weight(table: &HashMap<String, f64>, key: &str) -> f64 {
    table.get(key).copied().unwrap_or(NEUTRAL_WEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ALL_NAMESPACES, ALL_SERVICES, ALL_WORKLOADS};

    #[test]
    fn test_sentinels_are_neutral() {
        let resolver = MultiplierResolver::default();
        assert_eq!(resolver.resolve(ALL_NAMESPACES, ALL_SERVICES, ALL_WORKLOADS), 1.0);
    }

    #[test]
    fn test_unknown_values_are_neutral() {
        let resolver = MultiplierResolver::default();
        assert_eq!(resolver.namespace_weight("no-such-namespace"), 1.0);
        assert_eq!(resolver.service_weight(""), 1.0);
        assert_eq!(resolver.workload_weight("ratings-v9"), 1.0);
    }

    #[test]
    fn test_composite_is_product() {
        let resolver = MultiplierResolver::default();
        let m = resolver.resolve("istio-system", "productpage", "reviews-v3");
        assert!((m - 1.5 * 1.3 * 1.2).abs() < 1e-12);

        let m = resolver.resolve("default", ALL_SERVICES, "reviews-v2");
        assert!((m - 1.2 * 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_resolve_is_pure() {
        let resolver = MultiplierResolver::default();
        let first = resolver.resolve("default", "reviews", "reviews-v2");
        for _ in 0..10 {
            assert_eq!(resolver.resolve("default", "reviews", "reviews-v2"), first);
        }
    }

    #[test]
    fn test_injected_tables() {
        let mut tables = WeightTables::default();
        tables.namespaces.insert("payments".to_string(), 3.0);
        let resolver = MultiplierResolver::new(tables);
        assert_eq!(resolver.resolve("payments", ALL_SERVICES, ALL_WORKLOADS), 3.0);
    }

    #[test]
    fn test_latency_tiers() {
        let resolver = MultiplierResolver::default();
        assert_eq!(resolver.latency_baseline("reviews-v1"), 220.0);
        assert_eq!(resolver.latency_baseline("reviews-v2"), 180.0);
        assert_eq!(resolver.latency_baseline("reviews-v3"), 120.0);
        assert_eq!(resolver.latency_baseline(ALL_WORKLOADS), 160.0);
    }

    #[test]
    fn test_lookup_is_exact_key() {
        let resolver = MultiplierResolver::default();
        assert_eq!(resolver.workload_weight("ratings-v2"), 1.0);
        assert_eq!(resolver.workload_weight("reviews-v3-canary"), 1.0);
        assert_eq!(resolver.latency_baseline("ratings-v1"), 160.0);
        assert_eq!(resolver.latency_baseline("ratings-v2"), 160.0);
    }

    #[test]
    fn test_profile_from_selection() {
        let resolver = MultiplierResolver::default();
        let selection = FilterSelection::new("istio-system", ALL_SERVICES, "reviews-v1");
        let profile = resolver.profile(&selection);
        assert_eq!(profile.multiplier, 1.5);
        assert_eq!(profile.latency_baseline_ms, 220.0);
    }
}
