#[cfg(not(loom))]
pub(crate) use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

#[cfg(not(loom))]
pub(crate) use std::sync::{Condvar, Mutex, MutexGuard};

#[cfg(not(loom))]
pub(crate) type Contender = crossbeam_utils::Backoff;

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicBool, AtomicI64, Ordering};

#[cfg(loom)]
pub(crate) use loom::sync::{Condvar, Mutex, MutexGuard};

#[cfg(loom)]
pub(crate) type Contender = CustomBackoff;

#[cfg(loom)]
pub(crate) struct CustomBackoff;

// Loom only explores progress if a spinning thread hands control back to the model.
#[cfg(loom)]
impl CustomBackoff {
    pub fn new() -> Self {
        Self {}
    }

    pub fn spin(&self) {
        loom::thread::yield_now();
    }
}

/// Lock guards only protect plain `Copy` values here, a panicking holder cannot leave them torn.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
