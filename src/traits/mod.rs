//! Core traits for execution-context storage.

mod scope;

pub use scope::Scope;
