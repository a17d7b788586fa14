use std::fmt;
use std::hash::Hash;

use crate::context::ContextVar;
use crate::error::{ScopeError, ScopeResult};
use crate::internal::sync::{RwLock, StoreMap};
use crate::traits::Scope;

/// Share values within the same logical execution context.
///
/// Each key gets its own [`ContextVar`], registered on the first `set` for
/// that key; the value is then bound in the caller's current context. Child
/// tasks started through [`context::spawn`](crate::context::spawn) (or
/// wrapped with [`Context::scope`](crate::context::Context::scope)) see the
/// values bound when they were spawned and keep their own writes to
/// themselves. Independently scheduled tasks and other OS threads never see
/// them. A task started with plain `tokio::spawn` gets a private, initially
/// empty context of its own; see [`context`](crate::context) for its
/// lifetime.
///
/// Available with the `async` feature.
///
/// # Examples
///
/// ```rust
/// use ferrous_scopes::{context, Scope, TaskScope};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let scope = Arc::new(TaskScope::<&str, u32>::new());
///
/// let parent = scope.clone();
/// context::spawn(async move {
///     parent.set("the-key", 1);
///
///     let child = parent.clone();
///     let inherited = context::spawn(async move { child.get(&"the-key") });
///     assert_eq!(inherited.await.unwrap(), Ok(1));
///
///     let stranger = parent.clone();
///     let unrelated = tokio::spawn(async move { stranger.get(&"the-key") });
///     assert!(unrelated.await.unwrap().is_err());
/// })
/// .await
/// .unwrap();
/// # }
/// ```
pub struct TaskScope<K, V> {
    vars: RwLock<StoreMap<K, ContextVar<V>>>,
}

impl<K, V> TaskScope<K, V> {
    /// Creates a scope with no registered variables.
    pub fn new() -> Self {
        Self {
            vars: RwLock::new(StoreMap::default()),
        }
    }

    /// Number of keys that have a registered context variable.
    ///
    /// A key counts once it has been set in any context.
    pub fn registered(&self) -> usize {
        self.vars.read().len()
    }
}

impl<K: Eq + Hash, V> TaskScope<K, V> {
    fn var_for(&self, key: &K) -> Option<ContextVar<V>> {
        self.vars.read().get(key).cloned()
    }
}

impl<K, V> Default for TaskScope<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for TaskScope<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskScope")
            .field("registered", &self.registered())
            .finish()
    }
}

impl<K, V> Scope<K, V> for TaskScope<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync + 'static,
{
    fn set(&self, key: K, value: V) {
        let var = match self.var_for(&key) {
            Some(var) => var,
            None => self
                .vars
                .write()
                .entry(key)
                .or_insert_with(|| ContextVar::new("ferrous-scopes"))
                .clone(),
        };
        var.set(value);
    }

    fn get(&self, key: &K) -> ScopeResult<V, K> {
        self.var_for(key)
            .ok_or_else(|| ScopeError::NotFound(key.clone()))?
            .get()
            .map_err(|_| ScopeError::NotFound(key.clone()))
    }
}
