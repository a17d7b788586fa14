//! Internal implementation details.

use std::sync::atomic::{AtomicU64, Ordering};

pub(crate) mod sync;
pub(crate) mod thread_store;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates a process-unique identifier for a scope instance or context variable.
pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}
