//! Scope policy tables loaded from configuration.
//!
//! A container that lets operators choose scope policies per dependency
//! reads a [`ScopePolicy`]: a default kind plus per-name overrides. Policies
//! deserialize from JSON or from the environment.

use std::collections::BTreeMap;
use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kind::{ParseScopeKindError, ScopeKind};

/// Environment variable naming the default scope kind.
pub const DEFAULT_KIND_ENV: &str = "FERROUS_SCOPES_DEFAULT";

/// Errors produced while loading a [`ScopePolicy`].
#[derive(Debug)]
pub enum ConfigError {
    /// The JSON document was malformed or named an unknown kind
    Json(serde_json::Error),
    /// A string did not name a scope kind available in this build
    InvalidKind(ParseScopeKindError),
    /// An environment variable was set but not valid Unicode
    Env(env::VarError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(err) => write!(f, "Invalid scope policy: {}", err),
            ConfigError::InvalidKind(err) => write!(f, "Invalid scope policy: {}", err),
            ConfigError::Env(err) => write!(f, "Invalid scope policy: {}: {}", DEFAULT_KIND_ENV, err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(err) => Some(err),
            ConfigError::InvalidKind(err) => Some(err),
            ConfigError::Env(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err)
    }
}

impl From<ParseScopeKindError> for ConfigError {
    fn from(err: ParseScopeKindError) -> Self {
        ConfigError::InvalidKind(err)
    }
}

/// Which scope kind each named dependency should use.
///
/// # Examples
///
/// ```
/// use ferrous_scopes::{config::ScopePolicy, ScopeKind};
///
/// let policy = ScopePolicy::from_json(r#"{
///     "default": "noscope",
///     "overrides": { "database": "singleton", "session": "thread" }
/// }"#).unwrap();
///
/// assert_eq!(policy.kind_for("database"), ScopeKind::Process);
/// assert_eq!(policy.kind_for("session"), ScopeKind::Thread);
/// assert_eq!(policy.kind_for("anything-else"), ScopeKind::None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopePolicy {
    /// Kind used for names without an override
    #[serde(default = "default_kind")]
    pub default: ScopeKind,
    /// Per-name overrides
    #[serde(default)]
    pub overrides: BTreeMap<String, ScopeKind>,
}

fn default_kind() -> ScopeKind {
    ScopeKind::None
}

impl ScopePolicy {
    /// A policy using `default` for every name.
    pub fn new(default: ScopeKind) -> Self {
        Self {
            default,
            overrides: BTreeMap::new(),
        }
    }

    /// Adds an override for `name`.
    pub fn with_override(mut self, name: impl Into<String>, kind: ScopeKind) -> Self {
        self.overrides.insert(name.into(), kind);
        self
    }

    /// Kind to use for the dependency called `name`.
    pub fn kind_for(&self, name: &str) -> ScopeKind {
        self.overrides.get(name).copied().unwrap_or(self.default)
    }

    /// Parses a policy from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Renders the policy as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds a policy whose default comes from [`DEFAULT_KIND_ENV`].
    ///
    /// An unset variable yields the `none` default; a value that is not
    /// valid Unicode is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(DEFAULT_KIND_ENV) {
            Ok(value) => Ok(Self::new(value.parse()?)),
            Err(env::VarError::NotPresent) => Ok(Self::default()),
            Err(err) => Err(ConfigError::Env(err)),
        }
    }
}

impl Default for ScopePolicy {
    fn default() -> Self {
        Self::new(default_kind())
    }
}
