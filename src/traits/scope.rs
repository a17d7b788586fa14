//! The scope contract shared by every storage policy.

use std::sync::Arc;
use crate::error::ScopeResult;

/// Execution-context based storage.
///
/// A scope binds values to keys for "the current execution context", where
/// each implementation decides what a context is: the whole process, one OS
/// thread, one logical task, or nothing at all. A dependency container picks a
/// scope per registration and drives it with just two calls:
///
/// - [`get`](Scope::get) on every request; a
///   [`NotFound`](crate::ScopeError::NotFound) tells the container to build a
///   fresh instance,
/// - [`set`](Scope::set) once the fresh instance exists.
///
/// Values come back by identity: storing an `Arc<T>` and reading it from the
/// same context yields an `Arc` that is `Arc::ptr_eq` to the original.
///
/// The trait is object safe, so containers typically hold
/// `Arc<dyn Scope<K, V>>` and never branch on the concrete scope type.
///
/// # Examples
///
/// ```rust
/// use ferrous_scopes::{NullScope, ProcessScope, Scope, ScopeResult};
/// use std::sync::Arc;
///
/// fn get_or_build(scope: &dyn Scope<&'static str, Arc<String>>) -> Arc<String> {
///     match scope.get(&"greeting") {
///         Ok(value) => value,
///         Err(_) => {
///             let value = Arc::new("hello".to_string());
///             scope.set("greeting", value.clone());
///             value
///         }
///     }
/// }
///
/// let shared = ProcessScope::<&str, Arc<String>>::new();
/// let first = get_or_build(&shared);
/// assert!(Arc::ptr_eq(&first, &get_or_build(&shared)));
///
/// let none = NullScope;
/// let first = get_or_build(&none);
/// assert!(!Arc::ptr_eq(&first, &get_or_build(&none)));
/// ```
pub trait Scope<K, V>: Send + Sync {
    /// Binds `value` to `key` in the current execution context.
    ///
    /// Overwrites any binding for `key` previously made in the same context.
    /// Never fails.
    fn set(&self, key: K, value: V);

    /// Returns the value bound to `key` in the current execution context.
    ///
    /// Fails with [`ScopeError::NotFound`](crate::ScopeError::NotFound) when
    /// nothing is bound there, including when the context has no store yet.
    /// Never mutates the scope.
    fn get(&self, key: &K) -> ScopeResult<V, K>;
}

impl<K, V, S: Scope<K, V> + ?Sized> Scope<K, V> for Arc<S> {
    #[inline]
    fn set(&self, key: K, value: V) {
        (**self).set(key, value);
    }

    #[inline]
    fn get(&self, key: &K) -> ScopeResult<V, K> {
        (**self).get(key)
    }
}

impl<K, V, S: Scope<K, V> + ?Sized> Scope<K, V> for Box<S> {
    #[inline]
    fn set(&self, key: K, value: V) {
        (**self).set(key, value);
    }

    #[inline]
    fn get(&self, key: &K) -> ScopeResult<V, K> {
        (**self).get(key)
    }
}

impl<K, V, S: Scope<K, V> + ?Sized> Scope<K, V> for &S {
    #[inline]
    fn set(&self, key: K, value: V) {
        (**self).set(key, value);
    }

    #[inline]
    fn get(&self, key: &K) -> ScopeResult<V, K> {
        (**self).get(key)
    }
}
