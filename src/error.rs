//! Error types for scope lookups.

use std::fmt;

/// Scope lookup errors
///
/// A scope has exactly one way to fail: the caller asked for a key that has
/// no live binding in the current execution context. The failing key is
/// carried along so callers can report or assert on it.
///
/// A miss is ordinary control flow for a container: it builds a fresh value
/// and stores it with [`Scope::set`](crate::Scope::set).
///
/// # Examples
///
/// ```rust
/// use ferrous_scopes::{ProcessScope, Scope, ScopeError};
///
/// let scope = ProcessScope::<&str, u32>::new();
/// match scope.get(&"port") {
///     Err(ScopeError::NotFound(key)) => assert_eq!(key, "port"),
///     Ok(_) => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_scopes::ScopeError;
///
/// let err = ScopeError::NotFound("the-key");
/// assert_eq!(err.to_string(), "Scope entry not found: \"the-key\"");
/// assert_eq!(err.into_key(), "the-key");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError<K> {
    /// No binding for the key is visible from the current execution context
    NotFound(K),
}

impl<K> ScopeError<K> {
    /// Borrow the key that failed to resolve.
    pub fn key(&self) -> &K {
        match self {
            ScopeError::NotFound(key) => key,
        }
    }

    /// Consume the error and return the key that failed to resolve.
    pub fn into_key(self) -> K {
        match self {
            ScopeError::NotFound(key) => key,
        }
    }
}

impl<K: fmt::Debug> fmt::Display for ScopeError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeError::NotFound(key) => write!(f, "Scope entry not found: {:?}", key),
        }
    }
}

impl<K: fmt::Debug> std::error::Error for ScopeError<K> {}

/// Result type for scope lookups
///
/// A convenience alias for `Result<T, ScopeError<K>>`.
///
/// # Examples
///
/// ```rust
/// use ferrous_scopes::{ScopeError, ScopeResult};
///
/// fn lookup(found: bool) -> ScopeResult<u32, &'static str> {
///     if found { Ok(7) } else { Err(ScopeError::NotFound("answer")) }
/// }
///
/// assert_eq!(lookup(true), Ok(7));
/// assert!(lookup(false).is_err());
/// ```
pub type ScopeResult<T, K> = Result<T, ScopeError<K>>;
