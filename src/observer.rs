//! Diagnostic observers for scope traffic.
//!
//! This module provides hooks for watching what a scope stores and serves,
//! enabling structured logging of cache behaviour and hit/miss accounting
//! without touching the scopes themselves.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::ScopeResult;
use crate::traits::Scope;

/// Observer trait for scope events.
///
/// Every hook has an empty default body, so implementors only override what
/// they care about. `scope` is the label the observed scope was wrapped with.
///
/// # Performance
///
/// Hooks run synchronously inside `set`/`get`. Keep them cheap.
///
/// # Examples
///
/// ```
/// use ferrous_scopes::{Observed, ProcessScope, Scope, ScopeObserver};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct MissCounter(AtomicUsize);
///
/// impl<K> ScopeObserver<K> for MissCounter {
///     fn missed(&self, _scope: &str, _key: &K) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// let misses = Arc::new(MissCounter::default());
/// let scope = Observed::new("singletons", ProcessScope::<&str, u32>::new(), misses.clone());
///
/// assert!(scope.get(&"db").is_err());
/// scope.set("db", 1);
/// assert_eq!(scope.get(&"db"), Ok(1));
/// assert_eq!(misses.0.load(Ordering::Relaxed), 1);
/// ```
pub trait ScopeObserver<K>: Send + Sync {
    /// Called when a value is bound to `key`.
    fn stored(&self, _scope: &str, _key: &K) {}

    /// Called when `get` found a value for `key`.
    fn hit(&self, _scope: &str, _key: &K) {}

    /// Called when `get` found nothing for `key`.
    fn missed(&self, _scope: &str, _key: &K) {}
}

impl<K, O: ScopeObserver<K> + ?Sized> ScopeObserver<K> for Arc<O> {
    fn stored(&self, scope: &str, key: &K) {
        (**self).stored(scope, key);
    }

    fn hit(&self, scope: &str, key: &K) {
        (**self).hit(scope, key);
    }

    fn missed(&self, scope: &str, key: &K) {
        (**self).missed(scope, key);
    }
}

/// Built-in observer that reports events through `tracing`.
///
/// Stores and hits are emitted at `TRACE`, misses at `DEBUG`, all under the
/// `ferrous_scopes` target.
///
/// ```
/// use ferrous_scopes::{LoggingObserver, Observed, Scope, ThreadScope};
///
/// let scope = Observed::new(
///     "per-thread",
///     ThreadScope::<String, u8>::new(),
///     LoggingObserver::with_prefix("[worker]"),
/// );
/// scope.set("conn".to_string(), 1);
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a new logging observer with default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "[ferrous-scopes]".to_string(),
        }
    }

    /// Creates a new logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> ScopeObserver<K> for LoggingObserver {
    fn stored(&self, scope: &str, key: &K) {
        tracing::trace!(target: "ferrous_scopes", scope, ?key, "{} stored", self.prefix);
    }

    fn hit(&self, scope: &str, key: &K) {
        tracing::trace!(target: "ferrous_scopes", scope, ?key, "{} hit", self.prefix);
    }

    fn missed(&self, scope: &str, key: &K) {
        tracing::debug!(target: "ferrous_scopes", scope, ?key, "{} miss", self.prefix);
    }
}

/// Counts stores, hits and misses.
///
/// Useful for checking that a scope choice actually produces reuse.
#[derive(Debug, Default)]
pub struct MetricsObserver {
    stores: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MetricsObserver {
    /// Creates a new metrics observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the number of `set` calls observed.
    pub fn stores(&self) -> u64 {
        self.stores.load(Ordering::Relaxed)
    }

    /// Gets the number of successful `get` calls observed.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Gets the number of failed `get` calls observed.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Fraction of lookups that hit, or `None` before the first lookup.
    pub fn hit_ratio(&self) -> Option<f64> {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            return None;
        }
        Some(hits as f64 / total as f64)
    }

    /// Resets all counters.
    pub fn reset(&self) {
        self.stores.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

impl<K> ScopeObserver<K> for MetricsObserver {
    fn stored(&self, _scope: &str, _key: &K) {
        self.stores.fetch_add(1, Ordering::Relaxed);
    }

    fn hit(&self, _scope: &str, _key: &K) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn missed(&self, _scope: &str, _key: &K) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }
}

/// A scope wrapper that reports every `set` and `get` to an observer.
///
/// Results are passed through untouched, so an `Observed` scope behaves
/// exactly like the scope it wraps.
pub struct Observed<S, O> {
    label: &'static str,
    inner: S,
    observer: O,
}

impl<S, O> Observed<S, O> {
    /// Wraps `inner`, reporting events to `observer` under `label`.
    pub fn new(label: &'static str, inner: S, observer: O) -> Self {
        Self {
            label,
            inner,
            observer,
        }
    }

    /// Label events are reported under.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The wrapped scope.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// The observer receiving events.
    pub fn observer(&self) -> &O {
        &self.observer
    }
}

impl<S: fmt::Debug, O> fmt::Debug for Observed<S, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observed")
            .field("label", &self.label)
            .field("inner", &self.inner)
            .finish()
    }
}

impl<K, V, S, O> Scope<K, V> for Observed<S, O>
where
    S: Scope<K, V>,
    O: ScopeObserver<K>,
{
    fn set(&self, key: K, value: V) {
        // Reported first: the key moves into the store.
        self.observer.stored(self.label, &key);
        self.inner.set(key, value);
    }

    fn get(&self, key: &K) -> ScopeResult<V, K> {
        let result = self.inner.get(key);
        match &result {
            Ok(_) => self.observer.hit(self.label, key),
            Err(_) => self.observer.missed(self.label, key),
        }
        result
    }
}
