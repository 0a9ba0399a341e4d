//! Metrics sink boundary.
//!
//! The session accessor and the entity client report through MetricsEvent.
//! GlobalMetricsSink is the only bridge into the process-wide counters.

use crate::{
    entity::{CollectionName, MutationKind},
    obs::metrics,
};
use std::sync::{Arc, LazyLock};

///
/// MetricsEvent
///

#[derive(Clone, Debug, PartialEq)]
pub enum MetricsEvent {
    SessionFetch {
        attempts: u32,
        ok: bool,
    },
    CacheHit {
        collection: CollectionName,
    },
    CacheStale {
        collection: CollectionName,
    },
    CacheMiss {
        collection: CollectionName,
    },
    Fetch {
        collection: CollectionName,
        attempts: u32,
        ok: bool,
        rows: u64,
    },
    Mutation {
        collection: CollectionName,
        kind: MutationKind,
        ok: bool,
    },
    Invalidation {
        collection: CollectionName,
        entries: u64,
    },
}

impl MetricsEvent {
    #[must_use]
    pub const fn collection(&self) -> Option<&CollectionName> {
        match self {
            Self::SessionFetch { .. } => None,
            Self::CacheHit { collection }
            | Self::CacheStale { collection }
            | Self::CacheMiss { collection }
            | Self::Fetch { collection, .. }
            | Self::Mutation { collection, .. }
            | Self::Invalidation { collection, .. } => Some(collection),
        }
    }
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

///
/// GlobalMetricsSink
/// Default process-local sink that writes into the global counters.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state_mut(|m| {
            match &event {
                MetricsEvent::SessionFetch { attempts, ok } => {
                    m.ops.session_fetches = m.ops.session_fetches.saturating_add(1);
                    m.ops.session_attempts =
                        m.ops.session_attempts.saturating_add(u64::from(*attempts));
                    if !ok {
                        m.ops.session_failures = m.ops.session_failures.saturating_add(1);
                    }
                }
                MetricsEvent::CacheHit { .. } => {
                    m.ops.cache_hits = m.ops.cache_hits.saturating_add(1);
                }
                MetricsEvent::CacheStale { .. } => {
                    m.ops.cache_stale = m.ops.cache_stale.saturating_add(1);
                }
                MetricsEvent::CacheMiss { .. } => {
                    m.ops.cache_misses = m.ops.cache_misses.saturating_add(1);
                }
                MetricsEvent::Fetch { ok, rows, .. } => {
                    m.ops.fetches = m.ops.fetches.saturating_add(1);
                    m.ops.rows_fetched = m.ops.rows_fetched.saturating_add(*rows);
                    if !ok {
                        m.ops.fetch_failures = m.ops.fetch_failures.saturating_add(1);
                    }
                }
                MetricsEvent::Mutation { ok, .. } => {
                    m.ops.mutations = m.ops.mutations.saturating_add(1);
                    if !ok {
                        m.ops.mutation_failures = m.ops.mutation_failures.saturating_add(1);
                    }
                }
                MetricsEvent::Invalidation { entries, .. } => {
                    m.ops.invalidations = m.ops.invalidations.saturating_add(1);
                    m.ops.entries_invalidated = m.ops.entries_invalidated.saturating_add(*entries);
                }
            }

            if let Some(collection) = event.collection() {
                m.collections
                    .entry(collection.to_string())
                    .or_default()
                    .apply(&event);
            }
        });
    }
}

static GLOBAL_SINK: LazyLock<Arc<dyn MetricsSink>> = LazyLock::new(|| Arc::new(GlobalMetricsSink));

/// Shared handle to the global sink.
#[must_use]
pub fn global_sink() -> Arc<dyn MetricsSink> {
    Arc::clone(&GLOBAL_SINK)
}

///
/// TESTS
///
