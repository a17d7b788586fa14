//! Built-in scope implementations.
//!
//! | Scope          | Store                     | Visible to                          |
//! |----------------|---------------------------|-------------------------------------|
//! | [`ProcessScope`] | one, behind a mutex     | every thread and task               |
//! | [`ThreadScope`]  | one per OS thread       | the thread that stored the value    |
//! | `TaskScope`      | one per logical context | the context and children it spawns  |
//! | [`NullScope`]    | none                    | nobody                              |
//!
//! `TaskScope` requires the `async` feature.

mod null;
mod process;
mod thread;

#[cfg(feature = "async")]
mod task;

pub use null::NullScope;
pub use process::ProcessScope;
pub use thread::ThreadScope;

#[cfg(feature = "async")]
pub use task::TaskScope;
