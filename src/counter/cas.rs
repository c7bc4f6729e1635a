use crate::counter::CounterStrategy;
use crate::sync::Contender;
use crate::sync::{AtomicI64, Ordering};

/// Lock-free increment: retries a compare-and-swap until no other writer got in between.
#[derive(Debug, Default)]
pub struct CasCounter {
    value: AtomicI64,
}

impl CounterStrategy for CasCounter {
    fn increment(&self) {
        let mut current = self.value.load(Ordering::Acquire);
        let mut backoff: Option<Contender> = None;

        loop {
            match self.value.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => {
                    current = actual;
                    backoff.get_or_insert_with(Contender::new).spin();
                }
            }
        }
    }

    fn read(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }
}
