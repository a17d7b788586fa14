//! # ferrous-scopes
//!
//! Execution-context storage for dependency injection containers.
//!
//! A *scope* decides how long a constructed dependency lives and which
//! concurrent callers get to see the same instance. Every scope implements the
//! two-method [`Scope`] trait; a container calls [`Scope::get`] on each
//! request and, on a [`ScopeError::NotFound`], builds a fresh instance and
//! hands it to [`Scope::set`].
//!
//! ## Scopes
//!
//! - **[`ProcessScope`]**: one shared store, visible to every thread and task
//! - **[`ThreadScope`]**: one store per OS thread
//! - **`TaskScope`**: one store per logical task context, inherited by the
//!   tasks it spawns (`async` feature)
//! - **[`NullScope`]**: stores nothing, so every request builds anew
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_scopes::{Scope, ScopeKind, ScopeRegistry};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! let registry = ScopeRegistry::<&'static str, Arc<Database>>::new();
//! let scope = registry.scope(ScopeKind::Process);
//!
//! let resolve = || match scope.get(&"database") {
//!     Ok(db) => db,
//!     Err(_) => {
//!         let db = Arc::new(Database { url: "postgres://localhost".to_string() });
//!         scope.set("database", db.clone());
//!         db
//!     }
//! };
//!
//! let first = resolve();
//! let second = resolve();
//! assert!(Arc::ptr_eq(&first, &second));
//! assert_eq!(first.url, "postgres://localhost");
//! ```
//!
//! ## Thread Scopes
//!
//! ```rust
//! use ferrous_scopes::{Scope, ThreadScope};
//! use std::rc::Rc;
//!
//! // Values never cross threads, so they need not be `Send`.
//! let scope = ThreadScope::<&str, Rc<String>>::new();
//! scope.set("conn", Rc::new("thread-local connection".to_string()));
//! assert_eq!(*scope.get(&"conn").unwrap(), "thread-local connection");
//! ```
//!
//! ## Features
//!
//! - `async`: `TaskScope` and the [`context`] module (tokio task-locals)
//! - `parking-lot`: `parking_lot` locks for the shared stores
//! - `ahash`: `ahash` hashing for every store
//! - `once-cell`: `once_cell` slots in [`ScopeRegistry`]
//! - `config`: serde support and [`config::ScopePolicy`]
//! - `performance`: `parking-lot`, `ahash` and `once-cell` together

// Module declarations
pub mod error;
pub mod key;
pub mod kind;
pub mod observer;
pub mod registry;
pub mod scopes;
pub mod traits;

#[cfg(feature = "async")]
pub mod context;

#[cfg(feature = "config")]
pub mod config;

// Internal modules
mod internal;

// Re-export core types
pub use error::{ScopeError, ScopeResult};
pub use key::{key_of_named, key_of_type, Key};
pub use kind::{ParseScopeKindError, ScopeKind};
pub use observer::{LoggingObserver, MetricsObserver, Observed, ScopeObserver};
pub use registry::ScopeRegistry;
pub use scopes::{NullScope, ProcessScope, ThreadScope};
pub use traits::Scope;

#[cfg(feature = "async")]
pub use scopes::TaskScope;
