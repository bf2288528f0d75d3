//! Metrics sink boundary.
//!
//! Repository logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc, time::Instant};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Load,
    Save,
    Delete,
    Query,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    ExecStart {
        kind: ExecKind,
        entity_path: &'static str,
    },
    ExecFinish {
        kind: ExecKind,
        entity_path: &'static str,
        rows_touched: u64,
        elapsed_us: u64,
    },
    MetadataResolve {
        entity_path: &'static str,
        cache_hit: bool,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the per-thread metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ExecStart { kind, entity_path } => {
                metrics::with_state_mut(|m| {
                    let entry = m.entities.entry(entity_path.to_string()).or_default();
                    match kind {
                        ExecKind::Load => {
                            m.ops.load_calls = m.ops.load_calls.saturating_add(1);
                            entry.load_calls = entry.load_calls.saturating_add(1);
                        }
                        ExecKind::Save => {
                            m.ops.save_calls = m.ops.save_calls.saturating_add(1);
                            entry.save_calls = entry.save_calls.saturating_add(1);
                        }
                        ExecKind::Delete => {
                            m.ops.delete_calls = m.ops.delete_calls.saturating_add(1);
                            entry.delete_calls = entry.delete_calls.saturating_add(1);
                        }
                        ExecKind::Query => {
                            m.ops.query_calls = m.ops.query_calls.saturating_add(1);
                            entry.query_calls = entry.query_calls.saturating_add(1);
                        }
                    }
                });
            }

            MetricsEvent::ExecFinish {
                kind,
                entity_path,
                rows_touched,
                elapsed_us,
            } => {
                metrics::with_state_mut(|m| {
                    let entry = m.entities.entry(entity_path.to_string()).or_default();
                    match kind {
                        ExecKind::Load => {
                            m.ops.rows_loaded = m.ops.rows_loaded.saturating_add(rows_touched);
                            entry.rows_loaded = entry.rows_loaded.saturating_add(rows_touched);
                            metrics::add_elapsed(
                                &mut m.perf.load_us_total,
                                &mut m.perf.load_us_max,
                                elapsed_us,
                            );
                        }
                        ExecKind::Save => {
                            m.ops.rows_saved = m.ops.rows_saved.saturating_add(rows_touched);
                            entry.rows_saved = entry.rows_saved.saturating_add(rows_touched);
                            metrics::add_elapsed(
                                &mut m.perf.save_us_total,
                                &mut m.perf.save_us_max,
                                elapsed_us,
                            );
                        }
                        ExecKind::Delete => {
                            m.ops.rows_deleted = m.ops.rows_deleted.saturating_add(rows_touched);
                            entry.rows_deleted = entry.rows_deleted.saturating_add(rows_touched);
                            metrics::add_elapsed(
                                &mut m.perf.delete_us_total,
                                &mut m.perf.delete_us_max,
                                elapsed_us,
                            );
                        }
                        ExecKind::Query => {
                            m.ops.rows_queried = m.ops.rows_queried.saturating_add(rows_touched);
                            entry.rows_queried = entry.rows_queried.saturating_add(rows_touched);
                            metrics::add_elapsed(
                                &mut m.perf.query_us_total,
                                &mut m.perf.query_us_max,
                                elapsed_us,
                            );
                        }
                    }
                });
            }

            MetricsEvent::MetadataResolve {
                entity_path,
                cache_hit,
            } => {
                metrics::with_state_mut(|m| {
                    if cache_hit {
                        m.ops.metadata_hits = m.ops.metadata_hits.saturating_add(1);
                    } else {
                        m.ops.metadata_misses = m.ops.metadata_misses.saturating_add(1);
                        let entry = m.entities.entry(entity_path.to_string()).or_default();
                        entry.metadata_misses = entry.metadata_misses.saturating_add(1);
                    }
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    // clone out of the slot so a sink may itself install an override
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match override_sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current thread's metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state (counters + perf).
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

/// Span
/// RAII guard that emits start/finish metrics events for one repository call.
/// Ensures finish accounting happens even on early return or unwind.

pub(crate) struct Span {
    kind: ExecKind,
    entity_path: &'static str,
    start: Instant,
    rows: u64,
    enabled: bool,
}

impl Span {
    /// Start a span; a disabled span records nothing.
    #[must_use]
    pub(crate) fn new(kind: ExecKind, entity_path: &'static str, enabled: bool) -> Self {
        if enabled {
            record(MetricsEvent::ExecStart { kind, entity_path });
        }

        Self {
            kind,
            entity_path,
            start: Instant::now(),
            rows: 0,
            enabled,
        }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        if self.enabled {
            let elapsed_us = u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX);

            record(MetricsEvent::ExecFinish {
                kind: self.kind,
                entity_path: self.entity_path,
                rows_touched: self.rows,
                elapsed_us,
            });
        }
    }
}
