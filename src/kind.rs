//! Scope policy tags.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use std::sync::Arc;

use crate::scopes::{NullScope, ProcessScope, ThreadScope};
#[cfg(feature = "async")]
use crate::scopes::TaskScope;
use crate::traits::Scope;

/// Names one of the built-in scope policies.
///
/// Containers usually pick a kind per registration and ask a
/// [`ScopeRegistry`](crate::ScopeRegistry) for the matching shared scope.
///
/// # Policy Characteristics
///
/// - **Process**: one instance for the whole application
/// - **Thread**: one instance per OS thread
/// - **Task**: one instance per logical task context (`async` feature)
/// - **None**: a new instance on every request
///
/// # Examples
///
/// ```rust
/// use ferrous_scopes::ScopeKind;
///
/// assert_eq!("singleton".parse::<ScopeKind>().unwrap(), ScopeKind::Process);
/// assert_eq!("threadlocal".parse::<ScopeKind>().unwrap(), ScopeKind::Thread);
/// assert_eq!(ScopeKind::None.to_string(), "none");
/// assert!("request".parse::<ScopeKind>().is_err());
/// ```
///
/// With the `config` feature, kinds serialize as their canonical name and
/// deserialize through [`FromStr`], accepting exactly what `parse` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(try_from = "String", into = "String"))]
pub enum ScopeKind {
    /// Shared by every caller in the process
    Process,
    /// Shared within one OS thread
    Thread,
    /// Shared within one logical task context and the children it spawns
    #[cfg(feature = "async")]
    Task,
    /// Never shared
    None,
}

impl ScopeKind {
    /// Whether task-local scopes are compiled into this build.
    pub const fn task_supported() -> bool {
        cfg!(feature = "async")
    }

    /// Every kind available in this build.
    pub fn available() -> &'static [ScopeKind] {
        &[
            ScopeKind::Process,
            ScopeKind::Thread,
            #[cfg(feature = "async")]
            ScopeKind::Task,
            ScopeKind::None,
        ]
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Process => "process",
            ScopeKind::Thread => "thread",
            #[cfg(feature = "async")]
            ScopeKind::Task => "task",
            ScopeKind::None => "none",
        }
    }

    /// Creates a new, empty scope of this kind.
    ///
    /// ```rust
    /// use ferrous_scopes::{Scope, ScopeKind};
    ///
    /// let scope = ScopeKind::Process.build::<&str, u32>();
    /// scope.set("answer", 42);
    /// assert_eq!(scope.get(&"answer"), Ok(42));
    /// ```
    pub fn build<K, V>(&self) -> Arc<dyn Scope<K, V>>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        match self {
            ScopeKind::Process => Arc::new(ProcessScope::new()),
            ScopeKind::Thread => Arc::new(ThreadScope::new()),
            #[cfg(feature = "async")]
            ScopeKind::Task => Arc::new(TaskScope::new()),
            ScopeKind::None => Arc::new(NullScope),
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no scope kind available in this build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseScopeKindError {
    input: String,
}

impl ParseScopeKindError {
    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ParseScopeKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown scope kind: {}", self.input)
    }
}

impl std::error::Error for ParseScopeKindError {}

impl FromStr for ScopeKind {
    type Err = ParseScopeKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "process" | "singleton" => Ok(ScopeKind::Process),
            "thread" | "threadlocal" => Ok(ScopeKind::Thread),
            #[cfg(feature = "async")]
            "task" | "contextvars" => Ok(ScopeKind::Task),
            "none" | "noscope" => Ok(ScopeKind::None),
            _ => Err(ParseScopeKindError { input: s.to_string() }),
        }
    }
}

impl TryFrom<String> for ScopeKind {
    type Error = ParseScopeKindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScopeKind> for String {
    fn from(kind: ScopeKind) -> Self {
        kind.as_str().to_string()
    }
}
