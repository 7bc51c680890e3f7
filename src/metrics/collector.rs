// src/metrics/collector.rs
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::probe::ProbeResult;

/// Buckets in seconds, sized around the default 6 s probe budget.
const PROBE_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 6.0, 10.0, 30.0];

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    // Probe metrics
    pub probes_total: IntCounterVec,
    pub probe_duration_seconds: HistogramVec,

    // Batch metrics
    pub batches_total: IntCounterVec,
    pub batch_duration_seconds: HistogramVec,
    pub probes_in_flight: IntGauge,

    // API metrics
    pub requests_total: IntCounterVec,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let probes_total = IntCounterVec::new(
            Opts::new("status_probes_total", "Total number of settled probes"),
            &["outcome"],
        )?;
        registry.register(Box::new(probes_total.clone()))?;

        let probe_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "status_probe_duration_seconds",
                "Probe duration from dispatch to resolution",
            )
            .buckets(PROBE_BUCKETS.to_vec()),
            &["outcome"],
        )?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;

        let batches_total = IntCounterVec::new(
            Opts::new("status_batches_total", "Total number of check batches"),
            &["result"],
        )?;
        registry.register(Box::new(batches_total.clone()))?;

        let batch_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "status_batch_duration_seconds",
                "Batch duration until the slowest probe settled",
            )
            .buckets(PROBE_BUCKETS.to_vec()),
            &["result"],
        )?;
        registry.register(Box::new(batch_duration_seconds.clone()))?;

        let probes_in_flight =
            IntGauge::new("status_probes_in_flight", "Probes currently dispatched")?;
        registry.register(Box::new(probes_in_flight.clone()))?;

        let requests_total = IntCounterVec::new(
            Opts::new("status_api_requests_total", "Total API requests"),
            &["method", "path", "status_code"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        Ok(Self {
            probes_total,
            probe_duration_seconds,
            batches_total,
            batch_duration_seconds,
            probes_in_flight,
            requests_total,
        })
    }

    pub fn record_probe(&self, result: &ProbeResult) {
        let outcome = result.outcome();
        self.probes_total.with_label_values(&[outcome]).inc();
        self.probe_duration_seconds
            .with_label_values(&[outcome])
            .observe(Duration::from_millis(result.elapsed_millis).as_secs_f64());
    }

    pub fn record_batch(&self, accepted: bool, duration: Duration) {
        let result = if accepted { "completed" } else { "rejected" };
        self.batches_total.with_label_values(&[result]).inc();
        self.batch_duration_seconds
            .with_label_values(&[result])
            .observe(duration.as_secs_f64());
    }

    pub fn record_request(&self, method: &str, path: &str, status_code: u16) {
        let status = status_code.to_string();
        self.requests_total
            .with_label_values(&[method, path, &status])
            .inc();
    }

    /// Counts one request as in flight until the guard drops, including on
    /// cancellation or panic.
    pub fn track_in_flight(&self) -> InFlightGuard<'_> {
        self.probes_in_flight.inc();
        InFlightGuard { metrics: self }
    }
}

pub struct InFlightGuard<'a> {
    metrics: &'a MetricsCollector,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.metrics.probes_in_flight.dec();
    }
}

// Helper for timing operations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
