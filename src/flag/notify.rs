use std::time::{Duration, Instant};

use crate::flag::FlagStrategy;
use crate::sync::{Condvar, Mutex};

/// Mutex-guarded flag that also wakes threads parked in [`NotifyFlag::wait_for`].
pub struct NotifyFlag {
    state: Mutex<bool>,
    changed: Condvar,
}

impl Default for NotifyFlag {
    fn default() -> Self {
        Self {
            state: Mutex::new(false),
            changed: Condvar::new(),
        }
    }
}

impl NotifyFlag {
    /// Parks until the state equals `expected`. Returns `false` if `timeout` ran out first.
    pub fn wait_for(&self, expected: bool, timeout: Duration) -> bool {
        // A timeout too large to represent as an `Instant` never runs out.
        let deadline = Instant::now().checked_add(timeout);
        let mut guard = crate::sync::lock(&self.state);

        // Condvars wake spuriously; re-check the state on every return.
        while *guard != expected {
            guard = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return false;
                    }

                    match self.changed.wait_timeout(guard, remaining) {
                        Ok((guard, _)) => guard,
                        Err(poisoned) => poisoned.into_inner().0,
                    }
                }
                None => self
                    .changed
                    .wait(guard)
                    .unwrap_or_else(std::sync::PoisonError::into_inner),
            };
        }

        true
    }
}

impl FlagStrategy for NotifyFlag {
    fn store(&self, value: bool) {
        let mut guard = crate::sync::lock(&self.state);
        *guard = value;
        drop(guard);

        self.changed.notify_all();
    }

    fn load(&self) -> bool {
        *crate::sync::lock(&self.state)
    }
}
