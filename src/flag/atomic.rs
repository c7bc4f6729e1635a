use crate::flag::FlagStrategy;
use crate::sync::{AtomicBool, Ordering};

/// Release store paired with acquire load; the weakest ordering that publishes the write.
#[derive(Debug, Default)]
pub struct AtomicFlag {
    state: AtomicBool,
}

impl FlagStrategy for AtomicFlag {
    fn store(&self, value: bool) {
        self.state.store(value, Ordering::Release);
    }

    fn load(&self) -> bool {
        self.state.load(Ordering::Acquire)
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::AtomicFlag;
    use crate::flag::FlagStrategy;

    #[test]
    fn test_store() {
        let flag = AtomicFlag::default();
        assert!(!flag.load());
        flag.store(true);
        assert!(flag.load());
        flag.store(false);
        assert!(!flag.load());
    }
}
