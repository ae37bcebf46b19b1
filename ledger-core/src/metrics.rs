//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//!
//! # Metrics
//!
//! - `ledger_customers_created_total` - Customers onboarded
//! - `ledger_transfers_total{route}` - Committed transfers by route
//! - `ledger_transfers_rejected_total{reason}` - Rejected transfers by reason
//! - `ledger_partner_failures_total` - Failed partner bank calls
//! - `ledger_transfer_duration_seconds` - Histogram of transfer latencies

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, Histogram, HistogramOpts, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Customers onboarded
    pub customers_created: IntCounter,

    /// Committed transfers, labelled by route
    pub transfers_total: IntCounterVec,

    /// Rejected transfers, labelled by reason
    pub transfers_rejected: IntCounterVec,

    /// Failed partner calls
    pub partner_failures: IntCounter,

    /// Transfer duration histogram
    pub transfer_duration: Histogram,

    registry: Registry,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let customers_created = register_int_counter_with_registry!(
            Opts::new("ledger_customers_created_total", "Total number of customers onboarded"),
            registry
        )?;

        let transfers_total = register_int_counter_vec_with_registry!(
            Opts::new("ledger_transfers_total", "Total number of committed transfers"),
            &["route"],
            registry
        )?;

        let transfers_rejected = register_int_counter_vec_with_registry!(
            Opts::new("ledger_transfers_rejected_total", "Total number of rejected transfers"),
            &["reason"],
            registry
        )?;

        let partner_failures = register_int_counter_with_registry!(
            Opts::new("ledger_partner_failures_total", "Total number of failed partner calls"),
            registry
        )?;

        let transfer_duration = register_histogram_with_registry!(
            HistogramOpts::new(
                "ledger_transfer_duration_seconds",
                "Histogram of transfer latencies"
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.010, 0.050, 0.100, 0.250, 0.500, 1.0]),
            registry
        )?;

        Ok(Self {
            customers_created,
            transfers_total,
            transfers_rejected,
            partner_failures,
            transfer_duration,
            registry,
        })
    }

    /// Record onboarding
    pub fn record_customer_created(&self) {
        self.customers_created.inc();
    }

    /// Record a committed transfer
    pub fn record_transfer(&self, route: &str, duration_seconds: f64) {
        self.transfers_total.with_label_values(&[route]).inc();
        self.transfer_duration.observe(duration_seconds);
    }

    /// Record a rejected transfer
    pub fn record_rejection(&self, reason: &str) {
        self.transfers_rejected.with_label_values(&[reason]).inc();
    }

    /// Record a failed partner call
    pub fn record_partner_failure(&self) {
        self.partner_failures.inc();
    }

    /// Render all metrics in the Prometheus text format
    pub fn export(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("customers_created", &self.customers_created.get())
            .field("partner_failures", &self.partner_failures.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.customers_created.get(), 0);
        assert_eq!(metrics.partner_failures.get(), 0);

        // Independent registries: a second collector must not collide
        assert!(Metrics::new().is_ok());
    }

    #[test]
    fn test_record_transfer() {
        let metrics = Metrics::new().unwrap();
        metrics.record_transfer("internal", 0.002);
        metrics.record_transfer("internal", 0.004);
        metrics.record_transfer("external", 0.010);

        assert_eq!(metrics.transfers_total.with_label_values(&["internal"]).get(), 2);
        assert_eq!(metrics.transfers_total.with_label_values(&["external"]).get(), 1);
        assert_eq!(metrics.transfer_duration.get_sample_count(), 3);
    }

    #[test]
    fn test_export_contains_metric_names() {
        let metrics = Metrics::new().unwrap();
        metrics.record_customer_created();
        metrics.record_rejection("insufficient_funds");

        let text = metrics.export().unwrap();
        assert!(text.contains("ledger_customers_created_total 1"));
        assert!(text.contains("ledger_transfers_rejected_total{reason=\"insufficient_funds\"} 1"));
    }
}
