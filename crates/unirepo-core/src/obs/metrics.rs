use serde::{Deserialize, Serialize};
use std::{cell::RefCell, cmp::Ordering, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters and simple perf totals for operations.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub perf: EventPerf,
    pub entities: BTreeMap<String, EntityCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Repository entrypoints
    pub load_calls: u64,
    pub save_calls: u64,
    pub delete_calls: u64,
    pub query_calls: u64,

    // Rows touched
    pub rows_loaded: u64,
    pub rows_saved: u64,
    pub rows_deleted: u64,
    pub rows_queried: u64,

    // Key metadata
    pub metadata_hits: u64,
    pub metadata_misses: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntityCounters {
    pub load_calls: u64,
    pub save_calls: u64,
    pub delete_calls: u64,
    pub query_calls: u64,
    pub rows_loaded: u64,
    pub rows_saved: u64,
    pub rows_deleted: u64,
    pub rows_queried: u64,
    pub metadata_misses: u64,
}

///
/// EventPerf
/// Wall-clock totals per operation family, in microseconds.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventPerf {
    pub load_us_total: u128,
    pub save_us_total: u128,
    pub delete_us_total: u128,
    pub query_us_total: u128,

    // Maximum observed deltas
    pub load_us_max: u64,
    pub save_us_max: u64,
    pub delete_us_max: u64,
    pub query_us_max: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters and perf totals.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Accumulate an elapsed delta and track a max.
pub(crate) fn add_elapsed(total: &mut u128, max: &mut u64, delta_us: u64) {
    *total = total.saturating_add(u128::from(delta_us));
    if delta_us > *max {
        *max = delta_us;
    }
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: Option<EventState>,
    /// Per-entity counters and averages, busiest first.
    pub entity_counters: Vec<EntitySummary>,
}

///
/// EntitySummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntitySummary {
    pub path: String,
    pub load_calls: u64,
    pub save_calls: u64,
    pub delete_calls: u64,
    pub query_calls: u64,
    pub rows_loaded: u64,
    pub rows_deleted: u64,
    pub metadata_misses: u64,
    pub avg_rows_per_load: f64,
    pub avg_rows_per_query: f64,
}

/// Build a metrics report by inspecting in-memory counters only.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    let snap = with_state(Clone::clone);

    let avg = |rows: u64, calls: u64| {
        if calls > 0 {
            rows as f64 / calls as f64
        } else {
            0.0
        }
    };

    let mut entity_counters: Vec<EntitySummary> = snap
        .entities
        .iter()
        .map(|(path, ops)| EntitySummary {
            path: path.clone(),
            load_calls: ops.load_calls,
            save_calls: ops.save_calls,
            delete_calls: ops.delete_calls,
            query_calls: ops.query_calls,
            rows_loaded: ops.rows_loaded,
            rows_deleted: ops.rows_deleted,
            metadata_misses: ops.metadata_misses,
            avg_rows_per_load: avg(ops.rows_loaded, ops.load_calls),
            avg_rows_per_query: avg(ops.rows_queried, ops.query_calls),
        })
        .collect();

    entity_counters.sort_by(|a, b| {
        match b
            .avg_rows_per_load
            .partial_cmp(&a.avg_rows_per_load)
            .unwrap_or(Ordering::Equal)
        {
            Ordering::Equal => match b.rows_loaded.cmp(&a.rows_loaded) {
                Ordering::Equal => a.path.cmp(&b.path),
                other => other,
            },
            other => other,
        }
    });

    EventReport {
        counters: Some(snap),
        entity_counters,
    }
}

///
/// TESTS
///
