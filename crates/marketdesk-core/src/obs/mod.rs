//! Observability: runtime counters and the sink boundary that feeds them.
//!
//! Clients never touch `metrics` directly; every event flows through a
//! `MetricsSink`. Structured log lines go through `tracing` at the call site.

pub mod metrics;
pub mod sink;

pub use metrics::{CollectionCounters, EventOps, EventState};
pub use sink::{GlobalMetricsSink, MetricsEvent, MetricsSink, global_sink};
