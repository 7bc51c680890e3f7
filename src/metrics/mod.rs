// src/metrics/mod.rs
mod collector;

pub use collector::{InFlightGuard, MetricsCollector, MetricsRegistry, Timer};
