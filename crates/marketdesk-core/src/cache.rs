//! Read cache for entity queries.
//!
//! Entries are keyed by `QueryKey`. A write to a collection marks every entry
//! of that collection stale, whatever its filter. Each collection also
//! carries a generation counter: a fetch records the generation it started
//! under, and its result is discarded if the collection was invalidated
//! while it was in flight.
//!
//! The cache holds at most `max_entries` results. Past that, stale entries
//! are evicted before fresh ones, oldest first.

use crate::entity::{CollectionName, QueryKey, Record};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::time::Instant;

///
/// CacheLookup
///

#[derive(Clone, Debug, PartialEq)]
pub enum CacheLookup {
    Fresh(Arc<Vec<Record>>),
    Stale(Arc<Vec<Record>>),
    Miss,
}

impl CacheLookup {
    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }
}

///
/// CacheStats
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub entries: usize,
    pub stale: usize,
}

struct Entry {
    records: Arc<Vec<Record>>,
    fetched_at: Instant,
    stale: bool,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, Entry>,
    generations: HashMap<CollectionName, u64>,
    // bumped by `invalidate_all`/`clear`; folded into every generation
    epoch: u64,
}

impl CacheState {
    fn generation(&self, collection: &CollectionName) -> u64 {
        self.epoch
            .saturating_add(self.generations.get(collection).copied().unwrap_or(0))
    }
}

///
/// QueryCache
///

pub struct QueryCache {
    state: Mutex<CacheState>,
    stale_after: Option<Duration>,
    max_entries: usize,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self {
            state: Mutex::default(),
            stale_after: None,
            max_entries: Self::DEFAULT_MAX_ENTRIES,
        }
    }
}

impl QueryCache {
    pub const DEFAULT_MAX_ENTRIES: usize = 256;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper bound on stored results; clamped to at least one.
    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = if max_entries == 0 { 1 } else { max_entries };
        self
    }

    /// Entries older than `stale_after` are reported stale even without a write.
    #[must_use]
    pub const fn with_stale_after(mut self, stale_after: Option<Duration>) -> Self {
        self.stale_after = stale_after;
        self
    }

    #[must_use]
    pub fn lookup(&self, key: &QueryKey) -> CacheLookup {
        let state = self.lock();
        let Some(entry) = state.entries.get(key) else {
            return CacheLookup::Miss;
        };

        if self.is_stale(entry) {
            CacheLookup::Stale(Arc::clone(&entry.records))
        } else {
            CacheLookup::Fresh(Arc::clone(&entry.records))
        }
    }

    /// Generation to pass back to `store` for a fetch starting now.
    #[must_use]
    pub fn generation(&self, collection: &CollectionName) -> u64 {
        self.lock().generation(collection)
    }

    /// Store a fetched result. Returns `false` (and stores nothing) when the
    /// collection was invalidated after `generation` was taken.
    pub fn store(&self, key: QueryKey, records: Arc<Vec<Record>>, generation: u64) -> bool {
        let mut state = self.lock();
        if state.generation(&key.collection) != generation {
            return false;
        }

        state.entries.insert(
            key,
            Entry {
                records,
                fetched_at: Instant::now(),
                stale: false,
            },
        );
        self.evict_over_capacity(&mut state);

        true
    }

    /// Mark every entry of `collection` stale; returns how many entries it has.
    pub fn invalidate(&self, collection: &CollectionName) -> usize {
        let mut state = self.lock();
        let generation = state.generations.entry(collection.clone()).or_default();
        *generation = generation.saturating_add(1);

        let mut marked = 0;
        for (key, entry) in &mut state.entries {
            if &key.collection == collection {
                entry.stale = true;
                marked += 1;
            }
        }

        marked
    }

    pub fn invalidate_all(&self) -> usize {
        let mut state = self.lock();
        state.epoch = state.epoch.saturating_add(1);
        for entry in state.entries.values_mut() {
            entry.stale = true;
        }

        state.entries.len()
    }

    /// Drop every entry. In-flight fetches will not be stored.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.epoch = state.epoch.saturating_add(1);
        state.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();

        CacheStats {
            entries: state.entries.len(),
            stale: state.entries.values().filter(|e| e.stale).count(),
        }
    }

    fn is_stale(&self, entry: &Entry) -> bool {
        entry.stale
            || self
                .stale_after
                .is_some_and(|limit| entry.fetched_at.elapsed() >= limit)
    }

    fn evict_over_capacity(&self, state: &mut CacheState) {
        while state.entries.len() > self.max_entries {
            let victim = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| (!self.is_stale(entry), entry.fetched_at))
                .map(|(key, _)| key.clone());
            let Some(key) = victim else {
                break;
            };

            tracing::debug!(collection = %key.collection, "cache.evict");
            state.entries.remove(&key);
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

///
/// TESTS
///
