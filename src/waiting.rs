//! Waiting strategies for consumers blocked on a sequence barrier.
//!
//! # Purpose of Waiting Strategies
//!
//! A consumer that asks for a sequence the producer has not published yet has to spend the
//! time somehow. The choice represents a trade-off between:
//! - Latency (how quickly the consumer reacts to a publish)
//! - CPU usage (how much a waiting consumer burns)
//! - Thread context switching
//!
//! # Available Strategies
//!
//! | strategy | waits by | wake-up latency | CPU |
//! |----------|----------|-----------------|-----|
//! | [`BusySpinWaitStrategy`] | spinning | nanoseconds | one full core |
//! | [`YieldingWaitStrategy`] | spinning, then `yield_now` | microseconds | high |
//! | [`SleepingWaitStrategy`] | spinning, then sleeping 1µs | tens of microseconds | low |
//! | [`BlockingWaitStrategy`] | condition variable | scheduler wake-up | minimal |
//! | [`TimeoutBlockingWaitStrategy`] | condition variable with deadline | scheduler wake-up | minimal |
//!
//! Only the blocking strategies do any work in `signal_all_when_blocking`; the others notice a
//! publish on their next poll.
//!
//! Every strategy polls the barrier's alert between attempts, so an alerted barrier releases
//! its waiters within one polling interval.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::{
    error::{DisruptorError, Result},
    sequence::{AtomicSequence, Sequence},
    traits::WaitingStrategy,
    utils::Utils,
};

const YIELDING_SPIN_TRIES: u32 = 100;
const SLEEPING_RETRIES: u32 = 200;
const SLEEP_INTERVAL: Duration = Duration::from_micros(1);
/// Deadline used by [`TimeoutBlockingWaitStrategy::new`].
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(1);

#[inline]
fn available_sequence(cursor: &AtomicSequence, dependencies: &[Arc<AtomicSequence>]) -> Sequence {
    if dependencies.is_empty() {
        cursor.get()
    } else {
        Utils::get_minimum_sequence(dependencies, Sequence::MAX)
    }
}

#[derive(Default)]
pub struct BusySpinWaitStrategy;

impl WaitingStrategy for BusySpinWaitStrategy {
    fn new() -> Self {
        BusySpinWaitStrategy {}
    }

    fn wait_for<F: Fn() -> Result<()>>(
        &self,
        sequence: Sequence,
        cursor: &AtomicSequence,
        dependencies: &[Arc<AtomicSequence>],
        check_alert: F,
    ) -> Result<Sequence> {
        loop {
            let available = available_sequence(cursor, dependencies);
            if available >= sequence {
                return Ok(available);
            }

            check_alert()?;
            std::hint::spin_loop();
        }
    }

    fn signal_all_when_blocking(&self) {}
}

#[derive(Default)]
pub struct YieldingWaitStrategy;

impl WaitingStrategy for YieldingWaitStrategy {
    fn new() -> Self {
        YieldingWaitStrategy {}
    }

    fn wait_for<F: Fn() -> Result<()>>(
        &self,
        sequence: Sequence,
        cursor: &AtomicSequence,
        dependencies: &[Arc<AtomicSequence>],
        check_alert: F,
    ) -> Result<Sequence> {
        let mut counter = YIELDING_SPIN_TRIES;
        loop {
            let available = available_sequence(cursor, dependencies);
            if available >= sequence {
                return Ok(available);
            }

            check_alert()?;

            counter -= 1;
            if counter == 0 {
                std::thread::yield_now();
                counter = YIELDING_SPIN_TRIES;
            }
        }
    }

    fn signal_all_when_blocking(&self) {}
}

#[derive(Default)]
pub struct SleepingWaitStrategy;

impl WaitingStrategy for SleepingWaitStrategy {
    fn new() -> Self {
        SleepingWaitStrategy {}
    }

    fn wait_for<F: Fn() -> Result<()>>(
        &self,
        sequence: Sequence,
        cursor: &AtomicSequence,
        dependencies: &[Arc<AtomicSequence>],
        check_alert: F,
    ) -> Result<Sequence> {
        let mut counter = SLEEPING_RETRIES;
        loop {
            let available = available_sequence(cursor, dependencies);
            if available >= sequence {
                return Ok(available);
            }

            check_alert()?;

            counter -= 1;
            if counter == 0 {
                std::thread::sleep(SLEEP_INTERVAL);
                counter = SLEEPING_RETRIES;
            }
        }
    }

    fn signal_all_when_blocking(&self) {}
}

/// Parks waiters on a condition variable until the producer publishes.
///
/// The wait is split in two: park on the cursor under the lock, then spin on the dependent
/// consumers, which advance without signalling.
#[derive(Default)]
pub struct BlockingWaitStrategy {
    mutex: Mutex<()>,
    condition: Condvar,
}

impl WaitingStrategy for BlockingWaitStrategy {
    fn new() -> Self {
        Self::default()
    }

    fn wait_for<F: Fn() -> Result<()>>(
        &self,
        sequence: Sequence,
        cursor: &AtomicSequence,
        dependencies: &[Arc<AtomicSequence>],
        check_alert: F,
    ) -> Result<Sequence> {
        if cursor.get() < sequence {
            let mut guard = self.mutex.lock();
            while cursor.get() < sequence {
                check_alert()?;
                self.condition.wait(&mut guard);
            }
        }

        loop {
            let available = available_sequence(cursor, dependencies);
            if available >= sequence {
                return Ok(available);
            }
            check_alert()?;
            std::hint::spin_loop();
        }
    }

    fn signal_all_when_blocking(&self) {
        // Taking the lock orders the notify after any waiter's cursor check.
        let _guard = self.mutex.lock();
        self.condition.notify_all();
    }
}

/// [`BlockingWaitStrategy`] with a deadline on every `wait_for` call.
pub struct TimeoutBlockingWaitStrategy {
    mutex: Mutex<()>,
    condition: Condvar,
    timeout: Duration,
}

impl TimeoutBlockingWaitStrategy {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            mutex: Mutex::new(()),
            condition: Condvar::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for TimeoutBlockingWaitStrategy {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_WAIT_TIMEOUT)
    }
}

impl WaitingStrategy for TimeoutBlockingWaitStrategy {
    fn new() -> Self {
        Self::default()
    }

    fn wait_for<F: Fn() -> Result<()>>(
        &self,
        sequence: Sequence,
        cursor: &AtomicSequence,
        dependencies: &[Arc<AtomicSequence>],
        check_alert: F,
    ) -> Result<Sequence> {
        let deadline = Instant::now() + self.timeout;

        if cursor.get() < sequence {
            let mut guard = self.mutex.lock();
            while cursor.get() < sequence {
                check_alert()?;
                if self
                    .condition
                    .wait_until(&mut guard, deadline)
                    .timed_out()
                    && cursor.get() < sequence
                {
                    check_alert()?;
                    return Err(DisruptorError::Timeout);
                }
            }
        }

        loop {
            let available = available_sequence(cursor, dependencies);
            if available >= sequence {
                return Ok(available);
            }
            check_alert()?;
            if Instant::now() >= deadline {
                return Err(DisruptorError::Timeout);
            }
            std::hint::spin_loop();
        }
    }

    fn signal_all_when_blocking(&self) {
        let _guard = self.mutex.lock();
        self.condition.notify_all();
    }
}
