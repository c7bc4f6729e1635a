use crate::flag::FlagStrategy;
use crate::sync::Mutex;

/// Both accessors take the same mutex, so unlock/lock orders every write before later reads.
pub struct LockFlag {
    state: Mutex<bool>,
}

impl Default for LockFlag {
    fn default() -> Self {
        Self {
            state: Mutex::new(false),
        }
    }
}

impl FlagStrategy for LockFlag {
    fn store(&self, value: bool) {
        *crate::sync::lock(&self.state) = value;
    }

    fn load(&self) -> bool {
        *crate::sync::lock(&self.state)
    }
}
