use crate::obs::sink::MetricsEvent;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
};

///
/// EventState
/// Ephemeral, in-memory counters for session, cache, and write activity.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub collections: BTreeMap<String, CollectionCounters>,
}

impl EventState {
    const fn new() -> Self {
        Self {
            ops: EventOps::new(),
            collections: BTreeMap::new(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Session
    pub session_fetches: u64,
    pub session_attempts: u64,
    pub session_failures: u64,

    // Cache
    pub cache_hits: u64,
    pub cache_stale: u64,
    pub cache_misses: u64,

    // Reads
    pub fetches: u64,
    pub fetch_failures: u64,
    pub rows_fetched: u64,

    // Writes
    pub mutations: u64,
    pub mutation_failures: u64,
    pub invalidations: u64,
    pub entries_invalidated: u64,
}

impl EventOps {
    const fn new() -> Self {
        Self {
            session_fetches: 0,
            session_attempts: 0,
            session_failures: 0,
            cache_hits: 0,
            cache_stale: 0,
            cache_misses: 0,
            fetches: 0,
            fetch_failures: 0,
            rows_fetched: 0,
            mutations: 0,
            mutation_failures: 0,
            invalidations: 0,
            entries_invalidated: 0,
        }
    }
}

///
/// CollectionCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CollectionCounters {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub fetches: u64,
    pub rows_fetched: u64,
    pub mutations: u64,
    pub entries_invalidated: u64,
}

impl CollectionCounters {
    pub(crate) fn apply(&mut self, event: &MetricsEvent) {
        match event {
            MetricsEvent::CacheHit { .. } => self.cache_hits = self.cache_hits.saturating_add(1),
            MetricsEvent::CacheStale { .. } | MetricsEvent::CacheMiss { .. } => {
                self.cache_misses = self.cache_misses.saturating_add(1);
            }
            MetricsEvent::Fetch { rows, .. } => {
                self.fetches = self.fetches.saturating_add(1);
                self.rows_fetched = self.rows_fetched.saturating_add(*rows);
            }
            MetricsEvent::Mutation { .. } => self.mutations = self.mutations.saturating_add(1),
            MetricsEvent::Invalidation { entries, .. } => {
                self.entries_invalidated = self.entries_invalidated.saturating_add(*entries);
            }
            MetricsEvent::SessionFetch { .. } => {}
        }
    }
}

static EVENT_STATE: Mutex<EventState> = Mutex::new(EventState::new());

/// Mutate the global counters.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    let mut state = EVENT_STATE.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut state)
}

/// Point-in-time copy of the global counters.
#[must_use]
pub fn snapshot() -> EventState {
    EVENT_STATE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Reset all counters (useful in tests).
pub fn reset() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// TESTS
///
