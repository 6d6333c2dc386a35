//! Dataset cache: holds the last successful build and rebuilds it once
//! the freshness window has passed.
//!
//! RULES:
//!   - A snapshot is never mutated; a rebuild swaps in a new Arc.
//!   - Rebuilds are serialized: the state lock is held across fetch + build,
//!     so a caller arriving mid-rebuild waits and reuses the result.
//!   - A failed fetch or parse yields an empty dataset and leaves the build
//!     timestamp untouched, so the next call retries immediately.

use crate::{
    error::MonitorResult,
    record_builder::{Dataset, RecordBuilder},
    rng::RngBank,
    source::DataSource,
    synthesizer::ContextSynthesizer,
    types::MIN_FIELDS,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

pub const DEFAULT_FRESHNESS_WINDOW_SECS: i64 = 5 * 60;

#[derive(Default)]
struct CacheState {
    current: Option<Arc<Dataset>>,
    built_at: Option<DateTime<Utc>>,
    builds: u64,
}

impl CacheState {
    fn fresh(&self, now: DateTime<Utc>, window: Duration) -> Option<Arc<Dataset>> {
        match (&self.current, self.built_at) {
            (Some(dataset), Some(built_at)) if now - built_at < window => Some(Arc::clone(dataset)),
            _ => None,
        }
    }
}

pub struct DatasetCache {
    source: Box<dyn DataSource>,
    synthesizer: Arc<dyn ContextSynthesizer>,
    rng_bank: RngBank,
    freshness: Duration,
    min_fields: usize,
    state: Mutex<CacheState>,
}

impl DatasetCache {
    pub fn new(
        source: Box<dyn DataSource>,
        synthesizer: Arc<dyn ContextSynthesizer>,
        rng_bank: RngBank,
    ) -> Self {
        Self {
            source,
            synthesizer,
            rng_bank,
            freshness: Duration::seconds(DEFAULT_FRESHNESS_WINDOW_SECS),
            min_fields: MIN_FIELDS,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn with_freshness(mut self, window: Duration) -> Self {
        self.freshness = window;
        self
    }

    pub fn with_min_fields(mut self, min_fields: usize) -> Self {
        self.min_fields = min_fields;
        self
    }

    /// The current dataset, rebuilding first if it is missing or stale.
    /// Never fails: on error the result is an empty dataset.
    pub fn get(&self, now: DateTime<Utc>) -> Arc<Dataset> {
        let mut state = self.lock();
        if let Some(dataset) = state.fresh(now, self.freshness) {
            return dataset;
        }

        match self.rebuild(now, state.builds) {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                state.current = Some(Arc::clone(&dataset));
                state.built_at = Some(now);
                state.builds += 1;
                dataset
            }
            Err(e) => {
                log::error!("Failed to load transactions from {}: {e}", self.source.describe());
                Arc::new(Dataset::empty(now))
            }
        }
    }

    /// Drop the snapshot if it is older than the freshness window.
    /// Returns true when something was dropped.
    pub fn invalidate_if_stale(&self, now: DateTime<Utc>) -> bool {
        let mut state = self.lock();
        if state.current.is_some() && state.fresh(now, self.freshness).is_none() {
            state.current = None;
            state.built_at = None;
            return true;
        }
        false
    }

    /// Drop the snapshot unconditionally.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.current = None;
        state.built_at = None;
    }

    /// The cached snapshot, if any, without triggering a rebuild.
    pub fn peek(&self) -> Option<Arc<Dataset>> {
        self.lock().current.clone()
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.lock().built_at
    }

    /// Number of successful builds so far.
    pub fn build_count(&self) -> u64 {
        self.lock().builds
    }

    fn rebuild(&self, now: DateTime<Utc>, build_number: u64) -> MonitorResult<Dataset> {
        log::info!("Fetching transactions from {}", self.source.describe());
        let text = self.source.fetch()?;
        let mut rng = self.rng_bank.for_build(build_number);
        RecordBuilder::new(now, Arc::clone(&self.synthesizer))
            .with_min_fields(self.min_fields)
            .build_text(&text, &mut rng)
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Snapshots are swapped whole, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
