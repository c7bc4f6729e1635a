// Caller-side drivers that spawn, run and join the threads around one shared counter or flag.
// They hold no synchronization of their own beyond `join`; every guarantee they report on
// comes from the shared object under test.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::counter::{AtomicCounter, CounterStrategy};
use crate::error::{Error, Result};
use crate::flag::notify::NotifyFlag;
use crate::flag::{FlagStrategy, VisibleFlag};

pub const DEFAULT_THREADS: usize = 2;
pub const DEFAULT_INCREMENTS: u64 = 50_000;
pub const DEFAULT_HANDOFF_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_HANDOFF_TIMEOUT: Duration = Duration::from_secs(5);

/// Anything [`run_counter`] can hammer from several threads.
pub trait Increment: Send + Sync {
    fn increment(&self);
    fn read(&self) -> i64;
}

impl<S: CounterStrategy> Increment for AtomicCounter<S> {
    fn increment(&self) {
        AtomicCounter::increment(self);
    }

    fn read(&self) -> i64 {
        AtomicCounter::read(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterReport {
    pub threads: usize,
    pub increments: u64,
    pub expected: i64,
    pub observed: i64,
}

impl CounterReport {
    /// Increments issued but missing from the final value.
    pub fn lost(&self) -> i64 {
        self.expected - self.observed
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HandoffReport {
    pub polls: u64,
    pub elapsed: Duration,
}

/// Runs `threads` workers that each call `increment` `increments` times, then joins them all.
pub fn run_counter<C: Increment + 'static>(
    target: Arc<C>,
    threads: usize,
    increments: u64,
) -> Result<CounterReport> {
    let expected = u64::try_from(threads)
        .ok()
        .and_then(|threads| threads.checked_mul(increments))
        .and_then(|total| i64::try_from(total).ok())
        .ok_or(Error::TooManyIncrements {
            threads,
            increments,
        })?;

    let mut workers = Vec::with_capacity(threads);
    for idx in 0..threads {
        let target = Arc::clone(&target);
        let spawned = spawn_worker(idx, move || {
            log::debug!("#{} Increment Worker started", idx);
            let mut i = 0;
            while i < increments {
                target.increment();
                i += 1;
            }
            log::debug!("#{} Increment Worker finished!", idx);
        });

        match spawned {
            Ok(handle) => workers.push(handle),
            Err(err) => {
                // Already running workers still finish their increments.
                let _ = join_all(workers);
                return Err(err);
            }
        }
    }

    join_all(workers)?;

    let report = CounterReport {
        threads,
        increments,
        expected,
        observed: target.read(),
    };

    if report.lost() != 0 {
        log::warn!(
            "counter lost {} of {} increments",
            report.lost(),
            report.expected
        );
    }

    Ok(report)
}

/// A writer sets the flag after `delay` while a reader busy-polls for it.
pub fn run_handoff<S: FlagStrategy + 'static>(
    flag: Arc<VisibleFlag<S>>,
    delay: Duration,
    timeout: Duration,
) -> Result<HandoffReport> {
    handoff(flag, delay, move |flag| {
        log::debug!("Reader started spinning");
        flag.spin_until(true, timeout)
    })
}

/// Same handoff, but the reader parks on the condition variable instead of spinning.
pub fn run_blocking_handoff(
    flag: Arc<VisibleFlag<NotifyFlag>>,
    delay: Duration,
    timeout: Duration,
) -> Result<HandoffReport> {
    handoff(flag, delay, move |flag| {
        log::debug!("Reader started waiting");
        flag.wait_until(true, timeout).map(|_| 1)
    })
}

fn handoff<S, F>(flag: Arc<VisibleFlag<S>>, delay: Duration, await_fn: F) -> Result<HandoffReport>
where
    S: FlagStrategy + 'static,
    F: FnOnce(&VisibleFlag<S>) -> Result<u64> + Send + 'static,
{
    let started = Instant::now();

    let writer = {
        let flag = Arc::clone(&flag);
        spawn_worker(0, move || {
            log::debug!("Writer started");
            thread::sleep(delay);
            flag.set(true);
            log::debug!("Writer finished!");
        })?
    };

    let reader = {
        let flag = Arc::clone(&flag);
        spawn_worker(1, move || await_fn(&flag))
    };
    let reader = match reader {
        Ok(handle) => handle,
        Err(err) => {
            let _ = writer.join();
            return Err(err);
        }
    };

    // Both threads are joined before either failure is reported.
    let polls = reader.join().map_err(|payload| Error::panicked(1, payload));
    writer.join().map_err(|payload| Error::panicked(0, payload))?;
    let polls = polls??;

    log::debug!("Reader finished!");

    Ok(HandoffReport {
        polls,
        elapsed: started.elapsed(),
    })
}

fn spawn_worker<F, T>(worker: usize, f: F) -> Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .name(format!("worker-{}", worker))
        .spawn(f)
        .map_err(|source| Error::Spawn { worker, source })
}

fn join_all(workers: Vec<JoinHandle<()>>) -> Result<()> {
    // Every worker is joined, even after the first failure.
    let mut first_error = None;
    for (idx, handle) in workers.into_iter().enumerate() {
        if let Err(payload) = handle.join() {
            first_error.get_or_insert(Error::panicked(idx, payload));
        }
    }

    first_error.map_or(Ok(()), Err)
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use crate::flag::atomic::AtomicFlag;

    struct Exploding;

    impl Increment for Exploding {
        fn increment(&self) {
            panic!("increment exploded");
        }

        fn read(&self) -> i64 {
            0
        }
    }

    #[test]
    fn reports_default_scenario() {
        let report = run_counter(
            Arc::new(AtomicCounter::new()),
            DEFAULT_THREADS,
            DEFAULT_INCREMENTS,
        )
        .unwrap();

        assert_eq!(100_000, report.expected);
        assert_eq!(100_000, report.observed);
        assert_eq!(0, report.lost());
    }

    #[test]
    fn zero_threads_reports_zero() {
        let report = run_counter(Arc::new(AtomicCounter::new_lock()), 0, 10).unwrap();
        assert_eq!(0, report.expected);
        assert_eq!(0, report.observed);
    }

    #[test]
    fn worker_panic_is_surfaced() {
        let result = run_counter(Arc::new(Exploding), 2, 1);
        match result {
            Err(Error::WorkerPanicked { worker, message }) => {
                assert_eq!(0, worker);
                assert_eq!("increment exploded", message);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn oversized_run_is_rejected_before_spawning() {
        let counter = Arc::new(AtomicCounter::new());
        let result = run_counter(Arc::clone(&counter), 2, u64::MAX);

        assert!(matches!(
            result,
            Err(Error::TooManyIncrements {
                threads: 2,
                increments: u64::MAX
            })
        ));
        assert_eq!(0, counter.read());
    }

    #[test]
    fn zero_threads_accept_any_increment_count() {
        let report = run_counter(Arc::new(AtomicCounter::new()), 0, u64::MAX).unwrap();
        assert_eq!(0, report.expected);
    }

    #[test]
    fn workers_run_on_named_threads() {
        let handle = spawn_worker(7, || thread::current().name().map(str::to_string)).unwrap();
        assert_eq!(Some("worker-7".to_string()), handle.join().unwrap());
    }

    #[test]
    fn handoff_completes() {
        let flag = Arc::new(VisibleFlag::<AtomicFlag>::new());
        let report =
            run_handoff(Arc::clone(&flag), Duration::from_millis(20), Duration::from_secs(5)).unwrap();

        assert!(flag.get());
        assert!(report.polls >= 1);
        assert!(report.elapsed >= Duration::from_millis(20));
    }

    #[test]
    fn handoff_times_out_when_writer_is_too_slow() {
        let flag = Arc::new(VisibleFlag::new_lock());
        let result = run_handoff(flag, Duration::from_millis(200), Duration::from_millis(10));
        assert!(matches!(result, Err(Error::Timeout { .. })));
    }

    #[test]
    fn blocking_handoff_completes() {
        let flag = Arc::new(VisibleFlag::new_notify());
        let report = run_blocking_handoff(
            Arc::clone(&flag),
            Duration::from_millis(20),
            Duration::from_secs(5),
        )
        .unwrap();

        assert!(flag.get());
        assert_eq!(1, report.polls);
    }
}
