pub mod atomic;
pub mod lock;
pub mod notify;

use std::fmt::Debug;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::flag::atomic::AtomicFlag;
use crate::flag::lock::LockFlag;
use crate::flag::notify::NotifyFlag;
use crate::sync::Contender;

/// Storage behind a [`VisibleFlag`].
///
/// A `store` on one thread must happen-before every `load` that observes it, and a `load`
/// must really re-read shared memory each call so a polling loop cannot be optimized into
/// an infinite one.
pub trait FlagStrategy: Send + Sync + Default {
    fn store(&self, value: bool);
    fn load(&self) -> bool;
}

/// A boolean written by one thread and polled by others.
pub struct VisibleFlag<S = AtomicFlag>
where
    S: FlagStrategy,
{
    state: S,
}

impl VisibleFlag<AtomicFlag> {
    pub fn new() -> VisibleFlag<AtomicFlag> {
        VisibleFlag::with_strategy(AtomicFlag::default())
    }
}

impl VisibleFlag<LockFlag> {
    pub fn new_lock() -> VisibleFlag<LockFlag> {
        VisibleFlag::with_strategy(LockFlag::default())
    }
}

impl VisibleFlag<NotifyFlag> {
    pub fn new_notify() -> VisibleFlag<NotifyFlag> {
        VisibleFlag::with_strategy(NotifyFlag::default())
    }

    /// Blocks until the flag holds `expected`, without spinning.
    pub fn wait_until(&self, expected: bool, timeout: Duration) -> Result<()> {
        let started = Instant::now();
        if self.state.wait_for(expected, timeout) {
            Ok(())
        } else {
            Err(Error::Timeout {
                waited: started.elapsed(),
            })
        }
    }
}

impl<S: FlagStrategy> VisibleFlag<S> {
    pub fn with_strategy(state: S) -> VisibleFlag<S> {
        VisibleFlag { state }
    }

    pub fn set(&self, value: bool) {
        self.state.store(value);
    }

    pub fn get(&self) -> bool {
        self.state.load()
    }

    /// Busy-polls [`get`](Self::get) until it returns `expected`.
    ///
    /// Never sleeps; returns how many polls it took, or [`Error::Timeout`] once `timeout`
    /// has elapsed without observing `expected`.
    pub fn spin_until(&self, expected: bool, timeout: Duration) -> Result<u64> {
        let started = Instant::now();
        let contender = Contender::new();
        let mut polls: u64 = 0;

        loop {
            polls += 1;
            if self.get() == expected {
                log::trace!("flag reached {} after {} polls", expected, polls);
                return Ok(polls);
            }

            if started.elapsed() >= timeout {
                return Err(Error::Timeout {
                    waited: started.elapsed(),
                });
            }

            contender.spin();
        }
    }
}

impl Default for VisibleFlag<AtomicFlag> {
    fn default() -> Self {
        VisibleFlag::new()
    }
}

impl<S: FlagStrategy> Debug for VisibleFlag<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibleFlag")
            .field("state", &self.get())
            .finish()
    }
}
