//! Per-thread store registry backing `ThreadScope`.
//!
//! Every thread owns one registry mapping a scope id to that scope's store for
//! the thread. Slots share their owning scope's liveness flag. Dropping a
//! scope clears the flag and bumps a process-wide retirement counter; any
//! thread that next touches its registry sees the new count and sweeps out
//! the slots of dead scopes.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use super::sync::StoreMap;

static RETIRED: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static STORES: RefCell<Registry> = RefCell::new(Registry::default());
}

#[derive(Default)]
struct Registry {
    swept_at: u64,
    slots: HashMap<u64, Slot>,
}

struct Slot {
    owner: Arc<AtomicBool>,
    store: Box<dyn Any>,
}

/// Removes slots of dead scopes if any scope retired since the last sweep.
///
/// The evicted slots are returned so the caller can drop them after the
/// registry borrow ends.
fn sweep(registry: &RefCell<Registry>) -> Vec<Slot> {
    let retired = RETIRED.load(Ordering::Acquire);
    if registry.borrow().swept_at == retired {
        return Vec::new();
    }

    let mut registry = registry.borrow_mut();
    registry.swept_at = retired;
    let dead: Vec<u64> = registry
        .slots
        .iter()
        .filter(|(_, slot)| !slot.owner.load(Ordering::Acquire))
        .map(|(id, _)| *id)
        .collect();
    let evicted: Vec<Slot> = dead
        .iter()
        .filter_map(|id| registry.slots.remove(id))
        .collect();
    if !evicted.is_empty() {
        tracing::trace!(reclaimed = evicted.len(), "swept thread stores of dropped scopes");
    }
    evicted
}

/// Runs `f` against this thread's store for scope `id`, creating the store on
/// first use.
///
/// Returns `None` only while the thread is destroying its thread-locals.
/// Slots evicted along the way are dropped after the registry borrow ends, so
/// a value's `Drop` may safely touch another `ThreadScope`.
pub(crate) fn with_store_mut<K, V, R>(
    id: u64,
    owner: &Arc<AtomicBool>,
    f: impl FnOnce(&mut StoreMap<K, V>) -> R,
) -> Option<R>
where
    K: 'static,
    V: 'static,
{
    let mut evicted = Vec::new();
    let result = STORES
        .try_with(|registry| {
            evicted = sweep(registry);
            let mut registry = registry.borrow_mut();
            let slot = registry.slots.entry(id).or_insert_with(|| {
                tracing::trace!(scope_id = id, "creating thread store");
                Slot {
                    owner: Arc::clone(owner),
                    store: Box::new(StoreMap::<K, V>::default()),
                }
            });
            slot.store.downcast_mut::<StoreMap<K, V>>().map(f)
        })
        .ok()
        .flatten();
    drop(evicted);
    result
}

/// Runs `f` against this thread's existing store for scope `id`.
///
/// Never creates a store: returns `None` when this thread has not stored
/// anything for the scope yet.
pub(crate) fn with_store<K, V, R>(id: u64, f: impl FnOnce(&StoreMap<K, V>) -> R) -> Option<R>
where
    K: 'static,
    V: 'static,
{
    let mut evicted = Vec::new();
    let result = STORES
        .try_with(|registry| {
            evicted = sweep(registry);
            let registry = registry.borrow();
            registry
                .slots
                .get(&id)
                .and_then(|slot| slot.store.downcast_ref::<StoreMap<K, V>>())
                .map(f)
        })
        .ok()
        .flatten();
    drop(evicted);
    result
}

/// Drops this thread's store for scope `id`, if any.
pub(crate) fn release(id: u64) {
    let slot = STORES
        .try_with(|registry| registry.borrow_mut().slots.remove(&id))
        .ok()
        .flatten();
    drop(slot);
}

/// Marks scope `id` dead and drops this thread's store for it.
///
/// Other threads drop theirs on their next registry access.
pub(crate) fn retire(id: u64, owner: &AtomicBool) {
    owner.store(false, Ordering::Release);
    RETIRED.fetch_add(1, Ordering::AcqRel);
    release(id);
}

/// Number of live stores on the current thread.
#[cfg(test)]
pub(crate) fn store_count() -> usize {
    STORES.with(|registry| registry.borrow().slots.len())
}
