use crate::error::{ScopeError, ScopeResult};
use crate::traits::Scope;

/// Do not share values, build them on every request.
///
/// `set` discards the value and `get` always misses, so a container using
/// this scope constructs a new instance each time one is requested. The scope
/// holds no storage at all.
///
/// ```rust
/// use ferrous_scopes::{NullScope, Scope, ScopeError};
///
/// let scope: &dyn Scope<&str, u32> = &NullScope;
/// scope.set("the-key", 42);
/// assert_eq!(scope.get(&"the-key"), Err(ScopeError::NotFound("the-key")));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullScope;

impl NullScope {
    /// Creates a scope that never retains anything.
    pub const fn new() -> Self {
        NullScope
    }
}

impl<K: Clone, V> Scope<K, V> for NullScope {
    #[inline]
    fn set(&self, _key: K, _value: V) {}

    #[inline]
    fn get(&self, key: &K) -> ScopeResult<V, K> {
        Err(ScopeError::NotFound(key.clone()))
    }
}
