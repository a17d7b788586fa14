//! Context-local variables that follow logical tasks.
//!
//! A *context* is an immutable snapshot of variable bindings. The current
//! context is found in this order:
//!
//! 1. the one carried by a task or closure entered through [`spawn`],
//!    [`spawn_blocking`], [`Context::scope`] or [`Context::run`];
//! 2. otherwise, inside a tokio task started some other way (plain
//!    `tokio::spawn`), a *detached* context private to that task, keyed by
//!    its task id and starting empty;
//! 3. otherwise, the calling OS thread's root context, which starts empty.
//!
//! Writes are copy-on-write at the context boundary:
//!
//! - a child spawned after the parent's [`ContextVar::set`] observes the
//!   parent's value,
//! - the child's own writes never leak back to the parent,
//! - the parent's later writes never reach an already spawned child,
//! - tasks started with plain `tokio::spawn` inherit nothing and share
//!   nothing with their siblings.
//!
//! A detached context outlives its task until [`release_detached`] is
//! called from inside that task. Prefer [`spawn`] for tasks that bind
//! values.
//!
//! ```rust
//! use ferrous_scopes::context::{self, ContextVar};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let request_id = ContextVar::<u64>::new("request_id");
//! let child_var = request_id.clone();
//!
//! context::Context::new()
//!     .scope(async move {
//!         request_id.set(7);
//!
//!         let child = context::spawn(async move {
//!             let inherited = child_var.get().unwrap();
//!             child_var.set(8);
//!             inherited
//!         });
//!         assert_eq!(child.await.unwrap(), 7);
//!         assert_eq!(request_id.get().unwrap(), 7);
//!     })
//!     .await;
//! # }
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio::task::{self, JoinHandle};

use crate::internal::next_id;
use crate::internal::sync::{Mutex, OnceSlot, StoreMap};

type Bindings = StoreMap<u64, Arc<dyn Any + Send + Sync>>;
type Vars = Arc<Bindings>;

tokio::task_local! {
    static CURRENT: RefCell<Vars>;
}

thread_local! {
    static ROOT: RefCell<Vars> = RefCell::new(Vars::default());
}

static DETACHED: OnceSlot<Mutex<StoreMap<task::Id, Vars>>> = OnceSlot::new();

fn detached() -> &'static Mutex<StoreMap<task::Id, Vars>> {
    DETACHED.get_or_init(|| Mutex::new(StoreMap::default()))
}

/// Bindings of the innermost context. Never creates a detached context.
fn current_vars() -> Vars {
    if let Ok(vars) = CURRENT.try_with(|vars| vars.borrow().clone()) {
        return vars;
    }
    match task::try_id() {
        Some(id) => detached().lock().get(&id).cloned().unwrap_or_default(),
        None => ROOT.with(|vars| vars.borrow().clone()),
    }
}

/// Runs `f` against a private copy of the innermost context's bindings.
///
/// `f` must not run user code: it may execute under the detached-context lock.
fn update_current<R>(f: impl FnOnce(&mut Bindings) -> R) -> R {
    if CURRENT.try_with(|_| ()).is_ok() {
        return CURRENT.with(|vars| f(Arc::make_mut(&mut *vars.borrow_mut())));
    }
    match task::try_id() {
        Some(id) => {
            let mut tasks = detached().lock();
            let vars = tasks.entry(id).or_insert_with(|| {
                tracing::debug!(task_id = %id, "task has no inherited context, detaching one");
                Vars::default()
            });
            f(Arc::make_mut(vars))
        }
        None => ROOT.with(|vars| f(Arc::make_mut(&mut *vars.borrow_mut()))),
    }
}

/// Drops the detached context of the calling tokio task.
///
/// Returns `true` if the task had one. Tasks entered through [`spawn`] or
/// [`Context::scope`] never have a detached context, and neither does code
/// running outside a tokio task.
///
/// ```rust
/// use ferrous_scopes::context::{self, ContextVar};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let var = ContextVar::<u32>::new("attempt");
/// let handle = tokio::spawn(async move {
///     var.set(1);
///     assert_eq!(var.get(), Ok(1));
///     assert!(context::release_detached());
///     var.get().is_err()
/// });
/// assert!(handle.await.unwrap());
/// # }
/// ```
pub fn release_detached() -> bool {
    if CURRENT.try_with(|_| ()).is_ok() {
        return false;
    }
    let Some(id) = task::try_id() else {
        return false;
    };
    let released = detached().lock().remove(&id);
    released.is_some()
}

/// Error returned by [`ContextVar::get`] when the variable has no value in the
/// current context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupError {
    name: &'static str,
}

impl LookupError {
    /// Name of the variable that was looked up.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Context variable `{}` is not set in the current context", self.name)
    }
}

impl std::error::Error for LookupError {}

/// A variable whose value depends on the current logical context.
///
/// Handles are cheap to clone; clones refer to the same variable.
pub struct ContextVar<T> {
    id: u64,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ContextVar<T> {
    /// Creates a new variable, unset in every context.
    ///
    /// `name` is only used for diagnostics.
    pub fn new(name: &'static str) -> Self {
        let id = next_id();
        tracing::trace!(var_id = id, name, "registering context variable");
        Self {
            id,
            name,
            _marker: PhantomData,
        }
    }

    /// Diagnostic name given at construction.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: Clone + Send + Sync + 'static> ContextVar<T> {
    /// Binds `value` in the current context.
    ///
    /// Contexts already captured elsewhere keep their own bindings.
    pub fn set(&self, value: T) {
        let value: Arc<dyn Any + Send + Sync> = Arc::new(value);
        let previous = update_current(|vars| vars.insert(self.id, value));
        drop(previous);
    }

    /// Returns the value bound in the current context.
    pub fn get(&self) -> Result<T, LookupError> {
        let vars = current_vars();
        vars.get(&self.id)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
            .ok_or(LookupError { name: self.name })
    }

    /// Returns `true` when the variable has a value in the current context.
    pub fn is_set(&self) -> bool {
        current_vars().contains_key(&self.id)
    }
}

impl<T> Clone for ContextVar<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ContextVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextVar")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// A snapshot of context-variable bindings.
///
/// Capturing and cloning are O(1): the bindings are shared until one side
/// writes, at which point the writer takes a private copy.
#[derive(Clone, Default)]
pub struct Context {
    vars: Vars,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the bindings visible right now.
    pub fn current() -> Self {
        Self {
            vars: current_vars(),
        }
    }

    /// Number of variables bound in this snapshot.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` when no variable is bound in this snapshot.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Runs `f` synchronously inside this context.
    ///
    /// Writes made by `f` stay inside the call. Use this to carry a context
    /// onto an OS thread:
    ///
    /// ```rust
    /// use ferrous_scopes::context::{Context, ContextVar};
    ///
    /// let var = ContextVar::<&str>::new("locale");
    /// let inner = var.clone();
    /// let seen = Context::new().run(|| {
    ///     var.set("de_DE");
    ///     let ctx = Context::current();
    ///     std::thread::spawn(move || ctx.run(|| inner.get()))
    ///         .join()
    ///         .unwrap()
    /// });
    /// assert_eq!(seen, Ok("de_DE"));
    /// ```
    pub fn run<R>(self, f: impl FnOnce() -> R) -> R {
        CURRENT.sync_scope(RefCell::new(self.vars), f)
    }

    /// Wraps `future` so it polls inside this context.
    pub fn scope<F: Future>(self, future: F) -> impl Future<Output = F::Output> {
        CURRENT.scope(RefCell::new(self.vars), future)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("vars", &self.vars.len()).finish()
    }
}

/// Spawns `future` on the tokio runtime, inheriting the current context.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(Context::current().scope(future))
}

/// Runs `f` on tokio's blocking pool, inheriting the current context.
pub fn spawn_blocking<F, R>(f: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let context = Context::current();
    tokio::task::spawn_blocking(move || context.run(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variable_reports_its_name() {
        let var = ContextVar::<u8>::new("budget");
        let err = Context::new().run(|| var.get()).unwrap_err();
        assert_eq!(err.name(), "budget");
        assert_eq!(
            err.to_string(),
            "Context variable `budget` is not set in the current context"
        );
    }

    #[test]
    fn run_isolates_writes_from_caller() {
        let var = ContextVar::<u32>::new("n");
        Context::new().run(|| {
            var.set(1);
            Context::current().run(|| {
                assert_eq!(var.get(), Ok(1));
                var.set(2);
                assert_eq!(var.get(), Ok(2));
            });
            assert_eq!(var.get(), Ok(1));
        });
    }

    #[test]
    fn snapshot_does_not_see_later_writes() {
        let var = ContextVar::<u32>::new("n");
        Context::new().run(|| {
            var.set(1);
            let snapshot = Context::current();
            var.set(2);
            assert_eq!(snapshot.clone().run(|| var.get()), Ok(1));
            assert_eq!(snapshot.len(), 1);
        });
    }

    #[tokio::test]
    async fn plain_tasks_get_private_contexts() {
        let var = ContextVar::<u32>::new("n");

        let writer = var.clone();
        tokio::spawn(async move {
            writer.set(1);
            assert_eq!(writer.get(), Ok(1));
            assert!(release_detached());
            assert!(writer.get().is_err());
        })
        .await
        .unwrap();

        let reader = var.clone();
        assert!(tokio::spawn(async move { reader.get() }).await.unwrap().is_err());
        assert!(var.get().is_err());
    }

    #[tokio::test]
    async fn reads_never_detach_a_context() {
        let var = ContextVar::<u32>::new("n");
        let detached_by_reads = tokio::spawn(async move {
            assert!(var.get().is_err());
            assert!(!var.is_set());
            assert!(Context::current().is_empty());
            release_detached()
        })
        .await
        .unwrap();
        assert!(!detached_by_reads);
    }

    #[tokio::test]
    async fn inherited_and_runtime_body_contexts_are_never_detached() {
        let var = ContextVar::<u32>::new("n");
        var.set(1);
        assert!(!release_detached());
        assert_eq!(var.get(), Ok(1));

        let inner = var.clone();
        let released = spawn(async move {
            inner.set(2);
            release_detached()
        })
        .await
        .unwrap();
        assert!(!released);
    }

    #[tokio::test]
    async fn detached_context_is_inherited_through_spawn() {
        let var = ContextVar::<u32>::new("n");
        let outer = var.clone();
        let seen = tokio::spawn(async move {
            outer.set(3);
            let inner = outer.clone();
            let seen = spawn(async move { inner.get() }).await.unwrap();
            release_detached();
            seen
        })
        .await
        .unwrap();
        assert_eq!(seen, Ok(3));
    }

    #[test]
    fn thread_root_contexts_are_independent() {
        let var = ContextVar::<u32>::new("n");
        var.set(5);
        assert_eq!(var.get(), Ok(5));

        let other = var.clone();
        let seen = std::thread::spawn(move || other.get()).join().unwrap();
        assert!(seen.is_err());
    }
}
