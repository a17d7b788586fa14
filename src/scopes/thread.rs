use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::error::{ScopeError, ScopeResult};
use crate::internal::{next_id, thread_store};
use crate::traits::Scope;

/// Share values within the same OS thread.
///
/// Every thread gets its own store, created lazily by the first `set` made on
/// that thread. A value stored on one thread is never visible on another, even
/// under the identical key. Reads on a thread that never stored anything
/// miss without allocating a store.
///
/// Per-thread stores are released when their thread exits. Dropping the
/// scope releases the dropping thread's store immediately; every other
/// thread releases its store the next time it calls `set` or `get` on any
/// `ThreadScope`.
///
/// The scope itself is `Send + Sync` regardless of `K` and `V`, because
/// stored values never leave the thread that stored them.
///
/// # Examples
///
/// ```rust
/// use ferrous_scopes::{Scope, ThreadScope};
/// use std::sync::atomic::AtomicBool;
/// use std::sync::Arc;
/// use std::thread;
///
/// let scope = Arc::new(ThreadScope::<&str, Arc<u32>>::new());
/// scope.set("the-key", Arc::new(1));
/// assert_eq!(*scope.get(&"the-key").unwrap(), 1);
///
/// let worker_scope = scope.clone();
/// thread::spawn(move || {
///     assert!(worker_scope.get(&"the-key").is_err());
/// })
/// .join()
/// .unwrap();
/// ```
pub struct ThreadScope<K, V> {
    id: u64,
    alive: Arc<AtomicBool>,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> ThreadScope<K, V> {
    /// Creates a scope with no per-thread stores yet.
    pub fn new() -> Self {
        Self {
            id: next_id(),
            alive: Arc::new(AtomicBool::new(true)),
            _marker: PhantomData,
        }
    }

    /// Drops every binding the current thread made in this scope.
    pub fn clear_current_thread(&self) {
        thread_store::release(self.id);
    }
}

impl<K, V> Default for ThreadScope<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ThreadScope<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadScope").field("id", &self.id).finish()
    }
}

impl<K, V> Drop for ThreadScope<K, V> {
    fn drop(&mut self) {
        thread_store::retire(self.id, &self.alive);
    }
}

impl<K, V> Scope<K, V> for ThreadScope<K, V>
where
    K: Eq + Hash + Clone + 'static,
    V: Clone + 'static,
{
    fn set(&self, key: K, value: V) {
        let previous = thread_store::with_store_mut::<K, V, _>(self.id, &self.alive, |store| {
            store.insert(key, value)
        });
        drop(previous);
    }

    fn get(&self, key: &K) -> ScopeResult<V, K> {
        thread_store::with_store::<K, V, _>(self.id, |store| store.get(key).cloned())
            .flatten()
            .ok_or_else(|| ScopeError::NotFound(key.clone()))
    }
}
