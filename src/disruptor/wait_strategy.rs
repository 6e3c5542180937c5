//! Wait Strategy Implementation
//!
//! This module provides different wait strategies for the Disruptor pattern.
//! Wait strategies determine how consumers wait for new events to become available.

use crate::disruptor::backoff::{BackoffPolicy, SleepBackoff, SpinBackoff, YieldBackoff};
use crate::disruptor::{DisruptorError, FixedSequenceGroup, Result, Sequence, SequenceBarrier};
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Strategy for waiting for events to become available
///
/// Different strategies provide different trade-offs between CPU usage,
/// latency, and throughput. Every implementation polls
/// [`SequenceBarrier::check_alert`] between attempts, so cancellation is
/// observed within one poll interval.
pub trait WaitStrategy: Send + Sync + std::fmt::Debug {
    /// Wait until `dependent` reaches at least `sequence`
    ///
    /// # Arguments
    /// * `sequence` - The sequence to wait for
    /// * `cursor` - The producer cursor
    /// * `dependent` - The sequences this consumer depends on (the cursor itself
    ///   when there are no upstream processors)
    /// * `barrier` - The barrier being waited on, polled for alerts
    ///
    /// # Returns
    /// The available sequence, which may be higher than requested
    ///
    /// # Errors
    /// `Alert` if the barrier was alerted, `Timeout` for timeout-capable strategies
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependent: &FixedSequenceGroup,
        barrier: &dyn SequenceBarrier,
    ) -> Result<i64>;

    /// Wake any threads parked in this strategy
    ///
    /// Called by producers after publishing and by barriers on alert.
    fn signal_all_when_blocking(&self);
}

/// Attempt, else back off: the loop shared by every spinning strategy
#[inline]
fn wait_for_dependent<B: BackoffPolicy>(
    sequence: i64,
    dependent: &FixedSequenceGroup,
    barrier: &dyn SequenceBarrier,
    mut backoff: B,
) -> Result<i64> {
    loop {
        let available_sequence = dependent.get();
        if available_sequence >= sequence {
            return Ok(available_sequence);
        }
        barrier.check_alert()?;
        backoff.backoff();
    }
}

/// Blocking wait strategy using a lock and condition variable
///
/// Waits on the condition variable for the cursor, then spins briefly on the
/// dependent sequences outside the lock. Lowest CPU usage, highest latency.
#[derive(Debug, Default)]
pub struct BlockingWaitStrategy {
    mutex: Mutex<()>,
    condvar: Condvar,
}

impl BlockingWaitStrategy {
    /// Create a new blocking wait strategy
    pub fn new() -> Self {
        Self::default()
    }
}

impl WaitStrategy for BlockingWaitStrategy {
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependent: &FixedSequenceGroup,
        barrier: &dyn SequenceBarrier,
    ) -> Result<i64> {
        if cursor.get() < sequence {
            let mut guard = self.mutex.lock();
            while cursor.get() < sequence {
                barrier.check_alert()?;
                self.condvar.wait(&mut guard);
            }
        }

        wait_for_dependent(sequence, dependent, barrier, SpinBackoff)
    }

    fn signal_all_when_blocking(&self) {
        let _guard = self.mutex.lock();
        self.condvar.notify_all();
    }
}

/// Blocking wait strategy that gives up after a configured duration
///
/// Behaves like [`BlockingWaitStrategy`] but returns `Timeout` when the cursor
/// makes no progress within `timeout`, letting the processor do periodic work.
#[derive(Debug)]
pub struct TimeoutBlockingWaitStrategy {
    mutex: Mutex<()>,
    condvar: Condvar,
    timeout: Duration,
}

impl TimeoutBlockingWaitStrategy {
    pub fn new(timeout: Duration) -> Self {
        Self {
            mutex: Mutex::new(()),
            condvar: Condvar::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl WaitStrategy for TimeoutBlockingWaitStrategy {
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependent: &FixedSequenceGroup,
        barrier: &dyn SequenceBarrier,
    ) -> Result<i64> {
        if cursor.get() < sequence {
            let deadline = Instant::now() + self.timeout;
            let mut guard = self.mutex.lock();
            while cursor.get() < sequence {
                barrier.check_alert()?;
                if self.condvar.wait_until(&mut guard, deadline).timed_out()
                    && cursor.get() < sequence
                {
                    return Err(DisruptorError::Timeout);
                }
            }
        }

        wait_for_dependent(sequence, dependent, barrier, SpinBackoff)
    }

    fn signal_all_when_blocking(&self) {
        let _guard = self.mutex.lock();
        self.condvar.notify_all();
    }
}

/// Yielding wait strategy
///
/// Spins for a fixed number of attempts, then yields the thread on every
/// attempt. Never parks.
#[derive(Debug, Clone, Copy)]
pub struct YieldingWaitStrategy {
    spin_tries: u32,
}

impl YieldingWaitStrategy {
    /// Create a new yielding wait strategy
    pub fn new() -> Self {
        Self::with_spin_tries(YieldBackoff::DEFAULT_SPIN_TRIES)
    }

    pub fn with_spin_tries(spin_tries: u32) -> Self {
        Self { spin_tries }
    }
}

impl Default for YieldingWaitStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitStrategy for YieldingWaitStrategy {
    fn wait_for(
        &self,
        sequence: i64,
        _cursor: &Sequence,
        dependent: &FixedSequenceGroup,
        barrier: &dyn SequenceBarrier,
    ) -> Result<i64> {
        wait_for_dependent(sequence, dependent, barrier, YieldBackoff::new(self.spin_tries))
    }

    fn signal_all_when_blocking(&self) {}
}

/// Busy-spin wait strategy
///
/// Continuously polls without yielding the CPU. Lowest latency, but uses a
/// full core while waiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusySpinWaitStrategy;

impl BusySpinWaitStrategy {
    /// Create a new busy-spin wait strategy
    pub fn new() -> Self {
        Self
    }
}

impl WaitStrategy for BusySpinWaitStrategy {
    fn wait_for(
        &self,
        sequence: i64,
        _cursor: &Sequence,
        dependent: &FixedSequenceGroup,
        barrier: &dyn SequenceBarrier,
    ) -> Result<i64> {
        wait_for_dependent(sequence, dependent, barrier, SpinBackoff)
    }

    fn signal_all_when_blocking(&self) {}
}

/// Sleeping wait strategy
///
/// Spins, then yields, then sleeps for a fixed minimal duration on every
/// attempt. A compromise between CPU use and latency; expect latency spikes
/// after quiet periods. Producers never need to signal it.
#[derive(Debug, Clone, Copy)]
pub struct SleepingWaitStrategy {
    retries: u32,
    sleep_duration: Duration,
}

impl SleepingWaitStrategy {
    /// Create a new sleeping wait strategy with the default tiers
    pub fn new() -> Self {
        Self::with_retries(SleepBackoff::DEFAULT_RETRIES, SleepBackoff::DEFAULT_SLEEP)
    }

    /// # Arguments
    /// * `retries` - Attempts spent spinning and yielding before sleeping
    /// * `sleep_duration` - How long to sleep on each attempt after that
    pub fn with_retries(retries: u32, sleep_duration: Duration) -> Self {
        Self {
            retries,
            sleep_duration,
        }
    }
}

impl Default for SleepingWaitStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitStrategy for SleepingWaitStrategy {
    fn wait_for(
        &self,
        sequence: i64,
        _cursor: &Sequence,
        dependent: &FixedSequenceGroup,
        barrier: &dyn SequenceBarrier,
    ) -> Result<i64> {
        wait_for_dependent(
            sequence,
            dependent,
            barrier,
            SleepBackoff::new(self.retries, self.sleep_duration),
        )
    }

    fn signal_all_when_blocking(&self) {}
}
