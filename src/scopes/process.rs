use std::fmt;
use std::hash::Hash;

use crate::error::{ScopeError, ScopeResult};
use crate::internal::sync::{Mutex, StoreMap};
use crate::traits::Scope;

/// Share values across the whole application.
///
/// One store, created with the scope and guarded by a mutex, is visible to
/// every thread and task holding the scope. Each `set` and `get` is atomic;
/// the last writer for a key wins. Entries live until overwritten, removed,
/// or the scope is dropped.
///
/// With the `parking-lot` feature the store is guarded by
/// `parking_lot::Mutex`; otherwise by `std::sync::Mutex`.
///
/// # Examples
///
/// ```rust
/// use ferrous_scopes::{ProcessScope, Scope};
/// use std::sync::Arc;
/// use std::thread;
///
/// let scope = Arc::new(ProcessScope::<&str, Arc<String>>::new());
/// let value = Arc::new(String::from("shared"));
/// scope.set("the-key", value.clone());
///
/// let worker_scope = scope.clone();
/// let seen = thread::spawn(move || worker_scope.get(&"the-key"))
///     .join()
///     .unwrap()
///     .unwrap();
/// assert!(Arc::ptr_eq(&seen, &value));
/// ```
pub struct ProcessScope<K, V> {
    store: Mutex<StoreMap<K, V>>,
}

impl<K, V> ProcessScope<K, V> {
    /// Creates a scope with an empty store.
    pub fn new() -> Self {
        Self {
            store: Mutex::new(StoreMap::default()),
        }
    }

    /// Number of keys currently bound.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    /// Returns `true` when nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Drops every binding.
    pub fn clear(&self) {
        let drained: Vec<(K, V)> = self.store.lock().drain().collect();
        drop(drained);
    }
}

impl<K: Eq + Hash, V> ProcessScope<K, V> {
    /// Returns `true` when `key` is bound.
    pub fn contains_key(&self, key: &K) -> bool {
        self.store.lock().contains_key(key)
    }

    /// Unbinds `key`, returning the value it held.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.store.lock().remove(key)
    }
}

impl<K, V> Default for ProcessScope<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ProcessScope<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessScope")
            .field("entries", &self.len())
            .finish()
    }
}

impl<K, V> Scope<K, V> for ProcessScope<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn set(&self, key: K, value: V) {
        // The displaced value is dropped outside the lock.
        let previous = self.store.lock().insert(key, value);
        drop(previous);
    }

    fn get(&self, key: &K) -> ScopeResult<V, K> {
        self.store
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| ScopeError::NotFound(key.clone()))
    }
}
