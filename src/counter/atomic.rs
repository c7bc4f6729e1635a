use crate::counter::CounterStrategy;
use crate::sync::{AtomicI64, Ordering};

/// Increments with a single hardware fetch-and-add.
#[derive(Debug, Default)]
pub struct FetchAddCounter {
    value: AtomicI64,
}

impl CounterStrategy for FetchAddCounter {
    fn increment(&self) {
        self.value.fetch_add(1, Ordering::AcqRel);
    }

    fn read(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }
}
