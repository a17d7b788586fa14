//! Lock and map aliases selected by cargo features.

#[cfg(feature = "ahash")]
pub(crate) type StoreMap<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type StoreMap<K, V> = std::collections::HashMap<K, V>;

#[cfg(feature = "once-cell")]
pub(crate) use once_cell::sync::OnceCell as OnceSlot;
#[cfg(not(feature = "once-cell"))]
pub(crate) use std::sync::OnceLock as OnceSlot;

#[cfg(feature = "parking-lot")]
pub(crate) use parking_lot::{Mutex, RwLock};

#[cfg(not(feature = "parking-lot"))]
pub(crate) use self::std_locks::{Mutex, RwLock};

#[cfg(not(feature = "parking-lot"))]
mod std_locks {
    use std::sync::{MutexGuard, PoisonError, RwLockReadGuard, RwLockWriteGuard};

    /// `std::sync::Mutex` with the `parking_lot` calling convention.
    ///
    /// A panic while holding the lock cannot leave a store half-written (every
    /// critical section is a single map operation), so poisoning is ignored.
    #[derive(Debug, Default)]
    pub(crate) struct Mutex<T>(std::sync::Mutex<T>);

    impl<T> Mutex<T> {
        pub(crate) fn new(value: T) -> Self {
            Self(std::sync::Mutex::new(value))
        }

        pub(crate) fn lock(&self) -> MutexGuard<'_, T> {
            self.0.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// `std::sync::RwLock` with the `parking_lot` calling convention.
    #[derive(Debug, Default)]
    pub(crate) struct RwLock<T>(std::sync::RwLock<T>);

    impl<T> RwLock<T> {
        pub(crate) fn new(value: T) -> Self {
            Self(std::sync::RwLock::new(value))
        }

        pub(crate) fn read(&self) -> RwLockReadGuard<'_, T> {
            self.0.read().unwrap_or_else(PoisonError::into_inner)
        }

        pub(crate) fn write(&self) -> RwLockWriteGuard<'_, T> {
            self.0.write().unwrap_or_else(PoisonError::into_inner)
        }
    }
}
