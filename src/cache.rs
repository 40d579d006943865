//! Time-windowed snapshot cache with single-flight refresh
//!
//! A [`CachedValue`] owns one builder (for example "parse the presence CSV")
//! and the latest value it produced. Callers get a shared [`Arc`] snapshot.
//!
//! # Design
//!
//! ```text
//!  get() ──► entry fresh? ──yes──► clone Arc (read lock only)
//!               │ no
//!               ▼
//!         rebuild lock (one per key)
//!               │
//!               ├─► fresh now? another caller rebuilt it ──► clone Arc
//!               ├─► attempt we waited on failed? ──► same shared error
//!               └─► run builder ──► store entry, stamp built_at
//! ```
//!
//! - At most one builder invocation runs per key at any time. Callers that
//!   queue behind a rebuild receive its outcome instead of building again.
//! - `built_at` is stamped only on success. A failed rebuild leaves the
//!   previous entry untouched and the next caller retries.
//! - A stale entry is never served after a failed rebuild.

use crate::error::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests and simulations
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

type Builder<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;

struct CacheEntry<T> {
    value: Arc<T>,
    built_at: Instant,
}

#[derive(Default)]
struct RebuildState {
    /// Attempt number and error of the most recent rebuild, if it failed
    last_failure: Option<(u64, Arc<Error>)>,
}

/// Counters for a cached value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Calls answered from a fresh entry
    pub hits: u64,
    /// Successful builder invocations
    pub builds: u64,
    /// Failed builder invocations
    pub failures: u64,
}

/// A value rebuilt at most once per TTL window
pub struct CachedValue<T> {
    key: &'static str,
    ttl: Duration,
    builder: Builder<T>,
    clock: Arc<dyn Clock>,
    entry: RwLock<Option<CacheEntry<T>>>,
    rebuild: Mutex<RebuildState>,
    /// Finished rebuild attempts, successful or not
    completed: AtomicU64,
    hits: AtomicU64,
    builds: AtomicU64,
    failures: AtomicU64,
}

impl<T> CachedValue<T> {
    /// Wrap `builder` with a `ttl` validity window under the name `key`
    pub fn new<F>(key: &'static str, ttl: Duration, builder: F) -> Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        Self::with_clock(key, ttl, Arc::new(SystemClock), builder)
    }

    /// Same as [`CachedValue::new`] with an explicit clock
    pub fn with_clock<F>(key: &'static str, ttl: Duration, clock: Arc<dyn Clock>, builder: F) -> Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        Self {
            key,
            ttl,
            builder: Box::new(builder),
            clock,
            entry: RwLock::new(None),
            rebuild: Mutex::new(RebuildState::default()),
            completed: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            builds: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current value, rebuilding first if missing or older than the TTL
    pub fn get(&self) -> Result<Arc<T>> {
        if let Some(value) = self.fresh() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(key = self.key, "Cache hit");
            return Ok(value);
        }

        let seen = self.completed.load(Ordering::Acquire);
        let mut state = self.rebuild.lock();

        if let Some(value) = self.fresh() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }

        // Queued behind an attempt that failed: share its outcome
        if let Some((attempt, err)) = &state.last_failure {
            if *attempt > seen {
                return Err(self.refresh_error(Arc::clone(err)));
            }
        }

        let started = Instant::now();
        match (self.builder)() {
            Ok(value) => {
                let value = Arc::new(value);
                *self.entry.write() = Some(CacheEntry {
                    value: Arc::clone(&value),
                    built_at: self.clock.now(),
                });
                state.last_failure = None;
                self.builds.fetch_add(1, Ordering::Relaxed);
                self.completed.fetch_add(1, Ordering::Release);
                tracing::info!(
                    key = self.key,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Cache rebuilt"
                );
                Ok(value)
            }
            Err(err) => {
                let err = Arc::new(err);
                let attempt = self.completed.fetch_add(1, Ordering::Release) + 1;
                state.last_failure = Some((attempt, Arc::clone(&err)));
                self.failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(key = self.key, error = %err, "Cache rebuild failed");
                Err(self.refresh_error(err))
            }
        }
    }

    /// Current value if present and within the TTL, without rebuilding
    pub fn peek(&self) -> Option<Arc<T>> {
        self.fresh()
    }

    /// When the current entry was built
    pub fn built_at(&self) -> Option<Instant> {
        self.entry.read().as_ref().map(|entry| entry.built_at)
    }

    /// Drop the current entry so the next call rebuilds
    pub fn invalidate(&self) {
        *self.entry.write() = None;
        tracing::debug!(key = self.key, "Cache invalidated");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    fn fresh(&self) -> Option<Arc<T>> {
        let guard = self.entry.read();
        let entry = guard.as_ref()?;
        let age = self.clock.now().saturating_duration_since(entry.built_at);
        (age <= self.ttl).then(|| Arc::clone(&entry.value))
    }

    fn refresh_error(&self, source: Arc<Error>) -> Error {
        Error::Refresh {
            key: self.key,
            source,
        }
    }
}

impl<T> std::fmt::Debug for CachedValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedValue")
            .field("key", &self.key)
            .field("ttl", &self.ttl)
            .field("stats", &self.stats())
            .finish()
    }
}
