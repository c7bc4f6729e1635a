use crate::counter::CounterStrategy;
use crate::sync::Mutex;

/// Serializes every increment behind one mutex.
pub struct LockCounter {
    value: Mutex<i64>,
}

impl Default for LockCounter {
    fn default() -> Self {
        Self {
            value: Mutex::new(0),
        }
    }
}

impl CounterStrategy for LockCounter {
    fn increment(&self) {
        *crate::sync::lock(&self.value) += 1;
    }

    fn read(&self) -> i64 {
        *crate::sync::lock(&self.value)
    }
}
