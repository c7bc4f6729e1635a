pub mod atomic;
pub mod cas;
pub mod lock;

use std::fmt::Debug;
use std::sync::atomic::AtomicU64;

use crate::counter::atomic::FetchAddCounter;
use crate::counter::cas::CasCounter;
use crate::counter::lock::LockCounter;
use crate::sync::Ordering;

static COUNTER_ID_GEN: AtomicU64 = AtomicU64::new(0);

/// How an [`AtomicCounter`] serializes its increments.
///
/// Every implementation must make `increment` a single indivisible step with respect to
/// all other increments. Making the value merely visible to other threads is not enough:
/// a separate load and store still lets two threads read the same value and drop one update.
pub trait CounterStrategy: Send + Sync + Default {
    fn increment(&self);
    fn read(&self) -> i64;
}

/// A shared counter that never loses an increment, whatever the number of threads.
pub struct AtomicCounter<S = FetchAddCounter>
where
    S: CounterStrategy,
{
    id: u64,
    strategy: S,
}

impl AtomicCounter<FetchAddCounter> {
    pub fn new() -> AtomicCounter<FetchAddCounter> {
        AtomicCounter::with_strategy(FetchAddCounter::default())
    }
}

impl AtomicCounter<LockCounter> {
    pub fn new_lock() -> AtomicCounter<LockCounter> {
        AtomicCounter::with_strategy(LockCounter::default())
    }
}

impl AtomicCounter<CasCounter> {
    pub fn new_cas() -> AtomicCounter<CasCounter> {
        AtomicCounter::with_strategy(CasCounter::default())
    }
}

impl<S: CounterStrategy> AtomicCounter<S> {
    pub fn with_strategy(strategy: S) -> AtomicCounter<S> {
        AtomicCounter {
            id: COUNTER_ID_GEN.fetch_add(1, Ordering::Relaxed),
            strategy,
        }
    }

    /// Adds one to the counter.
    pub fn increment(&self) {
        self.strategy.increment();
    }

    /// Snapshot of the value, consistent with every increment completed before the call.
    pub fn read(&self) -> i64 {
        self.strategy.read()
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Default for AtomicCounter<FetchAddCounter> {
    fn default() -> Self {
        AtomicCounter::new()
    }
}

impl<S: CounterStrategy> Debug for AtomicCounter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicCounter")
            .field("id", &self.id)
            .field("value", &self.read())
            .finish()
    }
}
