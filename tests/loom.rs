#![cfg(loom)]

// RUSTFLAGS="--cfg loom" cargo test --release --test loom

use lib::counter::{AtomicCounter, CounterStrategy};
use lib::flag::{FlagStrategy, VisibleFlag};
use loom::sync::Arc;
use loom::thread;

fn execute_increments<S: CounterStrategy + 'static>(new_fn: fn() -> AtomicCounter<S>) {
    loom::model(move || {
        let counter = Arc::new(new_fn());

        let handles = (0..2)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || counter.increment())
            })
            .collect::<Vec<_>>();
        counter.increment();

        handles.into_iter().for_each(|handle| handle.join().unwrap());

        assert_eq!(3, counter.read());
    });
}

#[test]
fn test_fetch_add_never_loses_update() {
    execute_increments(AtomicCounter::new);
}

#[test]
fn test_lock_never_loses_update() {
    execute_increments(AtomicCounter::new_lock);
}

#[test]
fn test_cas_never_loses_update() {
    execute_increments(AtomicCounter::new_cas);
}

fn execute_read_never_goes_back<S: CounterStrategy + 'static>(new_fn: fn() -> AtomicCounter<S>) {
    loom::model(move || {
        let counter = Arc::new(new_fn());

        let writer = {
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                counter.increment();
                counter.increment();
            })
        };

        let first = counter.read();
        let second = counter.read();
        assert!(first <= second);

        writer.join().unwrap();
        assert_eq!(2, counter.read());
    });
}

#[test]
fn test_fetch_add_monotonic() {
    execute_read_never_goes_back(AtomicCounter::new);
}

#[test]
fn test_lock_monotonic() {
    execute_read_never_goes_back(AtomicCounter::new_lock);
}

#[test]
fn test_cas_monotonic() {
    execute_read_never_goes_back(AtomicCounter::new_cas);
}

struct Payload(loom::cell::UnsafeCell<u32>);

// Accesses are ordered by the flag under test; loom reports any that are not.
unsafe impl Sync for Payload {}

// Message passing through the flag: data written before `set(true)` must be visible to a
// reader that observed `true`.
fn execute_publish<S: FlagStrategy + 'static>(new_fn: fn() -> VisibleFlag<S>) {
    loom::model(move || {
        let flag = Arc::new(new_fn());
        let payload = Arc::new(Payload(loom::cell::UnsafeCell::new(0)));

        let writer = {
            let flag = Arc::clone(&flag);
            let payload = Arc::clone(&payload);
            thread::spawn(move || {
                payload.0.with_mut(|value| unsafe { *value = 42 });
                flag.set(true);
            })
        };

        if flag.get() {
            let value = payload.0.with(|value| unsafe { *value });
            assert_eq!(42, value);
        }

        writer.join().unwrap();
        assert!(flag.get());
    });
}

#[test]
fn test_atomic_flag_publishes() {
    execute_publish(VisibleFlag::new);
}

#[test]
fn test_lock_flag_publishes() {
    execute_publish(VisibleFlag::new_lock);
}

#[test]
fn test_notify_flag_publishes() {
    execute_publish(VisibleFlag::new_notify);
}

#[test]
fn test_notify_wait_is_woken() {
    loom::model(|| {
        let flag = Arc::new(VisibleFlag::new_notify());

        let writer = {
            let flag = Arc::clone(&flag);
            thread::spawn(move || flag.set(true))
        };

        flag.wait_until(true, std::time::Duration::from_secs(1))
            .unwrap();
        writer.join().unwrap();
    });
}
