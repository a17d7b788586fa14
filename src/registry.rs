//! Shared scope instances, one per policy.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::internal::sync::OnceSlot;
use crate::kind::ScopeKind;
use crate::traits::Scope;

type SharedScope<K, V> = Arc<dyn Scope<K, V>>;

/// Lazily built, shared scope instances keyed by [`ScopeKind`].
///
/// Keys are unique across a container, so every registration using the same
/// policy can share one scope object instead of allocating its own. The
/// registry builds each kind on first request and hands out the same `Arc`
/// afterwards.
///
/// With the `once-cell` feature the slots are `once_cell::sync::OnceCell`;
/// otherwise `std::sync::OnceLock`.
///
/// # Examples
///
/// ```rust
/// use ferrous_scopes::{Scope, ScopeKind, ScopeRegistry};
/// use std::sync::Arc;
///
/// let registry = ScopeRegistry::<&str, u32>::new();
/// let a = registry.scope(ScopeKind::Process);
/// let b = registry.scope(ScopeKind::Process);
/// assert!(Arc::ptr_eq(&a, &b));
///
/// a.set("answer", 42);
/// assert_eq!(b.get(&"answer"), Ok(42));
/// ```
pub struct ScopeRegistry<K, V> {
    process: OnceSlot<SharedScope<K, V>>,
    thread: OnceSlot<SharedScope<K, V>>,
    #[cfg(feature = "async")]
    task: OnceSlot<SharedScope<K, V>>,
    none: OnceSlot<SharedScope<K, V>>,
}

impl<K, V> ScopeRegistry<K, V> {
    /// Creates a registry with no scopes built yet.
    pub fn new() -> Self {
        Self {
            process: OnceSlot::new(),
            thread: OnceSlot::new(),
            #[cfg(feature = "async")]
            task: OnceSlot::new(),
            none: OnceSlot::new(),
        }
    }

    fn slot(&self, kind: ScopeKind) -> &OnceSlot<SharedScope<K, V>> {
        match kind {
            ScopeKind::Process => &self.process,
            ScopeKind::Thread => &self.thread,
            #[cfg(feature = "async")]
            ScopeKind::Task => &self.task,
            ScopeKind::None => &self.none,
        }
    }

    /// Returns the scope for `kind` if it has been built already.
    pub fn existing(&self, kind: ScopeKind) -> Option<SharedScope<K, V>> {
        self.slot(kind).get().cloned()
    }
}

impl<K, V> ScopeRegistry<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Returns the shared scope for `kind`, building it on first use.
    pub fn scope(&self, kind: ScopeKind) -> SharedScope<K, V> {
        self.slot(kind)
            .get_or_init(|| {
                tracing::debug!(kind = %kind, "building shared scope");
                kind.build()
            })
            .clone()
    }
}

impl<K, V> Default for ScopeRegistry<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ScopeRegistry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let built: Vec<ScopeKind> = ScopeKind::available()
            .iter()
            .copied()
            .filter(|kind| self.slot(*kind).get().is_some())
            .collect();
        f.debug_struct("ScopeRegistry").field("built", &built).finish()
    }
}
