//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Repository code emits `MetricsEvent`s through the sink boundary only;
//! it never touches the counter state directly.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EntityCounters, EntitySummary, EventOps, EventPerf, EventReport, EventState};
pub use sink::{
    ExecKind, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink,
};
