use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::equality::SafeEq;

// Listeners never run while one of these locks is held, so a poisoned lock only
// means a panic unwound through unrelated code. The data is still consistent.
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> { lock.read().unwrap_or_else(PoisonError::into_inner) }

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> { lock.write().unwrap_or_else(PoisonError::into_inner) }

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> { mutex.lock().unwrap_or_else(PoisonError::into_inner) }

/// Shared storage for the present value of a cell. `None` means the cell has not
/// received its first value yet.
pub(crate) struct ValueCell<T>(Arc<RwLock<Option<T>>>);

impl<T> Clone for ValueCell<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> ValueCell<T> {
    pub fn new(value: Option<T>) -> Self { Self(Arc::new(RwLock::new(value))) }

    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        let guard = read(&self.0);
        f(guard.as_ref())
    }

    pub fn is_set(&self) -> bool { read(&self.0).is_some() }
}

impl<T: Clone> ValueCell<T> {
    pub fn value(&self) -> Option<T> { read(&self.0).clone() }
}

impl<T: SafeEq + Clone> ValueCell<T> {
    /// Stores `value` unless it is equal to the present one.
    /// Returns the value to broadcast when the store happened.
    pub fn replace_if_changed(&self, value: T) -> Option<T> {
        let mut current = write(&self.0);
        if let Some(present) = current.as_ref() {
            if !present.safe_ne(&value) {
                return None;
            }
        }
        *current = Some(value.clone());
        Some(value)
    }
}
