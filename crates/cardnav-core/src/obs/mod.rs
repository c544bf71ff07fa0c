//! Observability: in-memory counters describing resolver traffic.
//!
//! Resolution logic MUST NOT depend on `obs::metrics` directly.
//! All instrumentation flows through `MetricsEvent` and `MetricsSink`;
//! `sink` is the only bridge between resolution code and the global
//! metrics state.

pub mod metrics;
pub mod sink;
