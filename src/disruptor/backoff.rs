//! Backoff policies for busy-wait loops
//!
//! Every spinning loop in the crate has the same shape: make an attempt, and if
//! it fails call [`BackoffPolicy::backoff`] before trying again. The policy
//! decides whether that means a pause hint, a yield, or a short sleep.

use std::hint;
use std::thread;
use std::time::Duration;

/// Decides how a thread waits between two failed attempts
pub trait BackoffPolicy {
    /// Called after a failed attempt, before the next one
    fn backoff(&mut self);

    /// Start over from the most aggressive tier
    fn reset(&mut self) {}
}

/// Pure spin: a CPU pause hint and nothing else
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinBackoff;

impl BackoffPolicy for SpinBackoff {
    #[inline]
    fn backoff(&mut self) {
        hint::spin_loop();
    }
}

/// Spin for a fixed number of attempts, then yield on every attempt
#[derive(Debug, Clone, Copy)]
pub struct YieldBackoff {
    spin_tries: u32,
    counter: u32,
}

impl YieldBackoff {
    pub const DEFAULT_SPIN_TRIES: u32 = 100;

    pub fn new(spin_tries: u32) -> Self {
        Self {
            spin_tries,
            counter: spin_tries,
        }
    }
}

impl Default for YieldBackoff {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SPIN_TRIES)
    }
}

impl BackoffPolicy for YieldBackoff {
    #[inline]
    fn backoff(&mut self) {
        if self.counter == 0 {
            thread::yield_now();
        } else {
            self.counter -= 1;
            hint::spin_loop();
        }
    }

    fn reset(&mut self) {
        self.counter = self.spin_tries;
    }
}

/// Three tiers: spin, then yield, then sleep a fixed duration on every attempt
///
/// With `retries` = R the first `R - 100` attempts spin, the next 100 (or all
/// R when R <= 100) yield, and everything after that sleeps.
#[derive(Debug, Clone, Copy)]
pub struct SleepBackoff {
    retries: u32,
    counter: u32,
    sleep: Duration,
}

impl SleepBackoff {
    pub const DEFAULT_RETRIES: u32 = 200;
    pub const DEFAULT_SLEEP: Duration = Duration::from_nanos(100);
    const YIELD_TRIES: u32 = 100;

    pub fn new(retries: u32, sleep: Duration) -> Self {
        Self {
            retries,
            counter: retries,
            sleep,
        }
    }

    /// Policy used by producers stalled on capacity: park on every attempt
    pub fn parking() -> Self {
        Self::new(0, Duration::from_nanos(1))
    }
}

impl Default for SleepBackoff {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RETRIES, Self::DEFAULT_SLEEP)
    }
}

impl BackoffPolicy for SleepBackoff {
    #[inline]
    fn backoff(&mut self) {
        if self.counter > Self::YIELD_TRIES {
            self.counter -= 1;
            hint::spin_loop();
        } else if self.counter > 0 {
            self.counter -= 1;
            thread::yield_now();
        } else {
            thread::sleep(self.sleep);
        }
    }

    fn reset(&mut self) {
        self.counter = self.retries;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_yield_backoff_progression() {
        let mut b = YieldBackoff::new(3);
        for _ in 0..3 {
            b.backoff();
        }
        assert_eq!(b.counter, 0);

        // Stays in the yield tier
        b.backoff();
        assert_eq!(b.counter, 0);

        b.reset();
        assert_eq!(b.counter, 3);
    }

    #[test]
    fn test_sleep_backoff_tiers() {
        let mut b = SleepBackoff::new(102, Duration::from_micros(50));

        // Two spins
        b.backoff();
        b.backoff();
        assert_eq!(b.counter, SleepBackoff::YIELD_TRIES);

        for _ in 0..SleepBackoff::YIELD_TRIES {
            b.backoff();
        }
        assert_eq!(b.counter, 0);

        let start = Instant::now();
        b.backoff();
        assert!(start.elapsed() >= Duration::from_micros(50));

        b.reset();
        assert_eq!(b.counter, 102);
    }

    #[test]
    fn test_parking_backoff_sleeps_immediately() {
        let b = SleepBackoff::parking();
        assert_eq!(b.counter, 0);
        assert_eq!(b.sleep, Duration::from_nanos(1));
    }

    #[test]
    fn test_spin_backoff_does_not_block() {
        let mut b = SpinBackoff;
        for _ in 0..1000 {
            b.backoff();
        }
        b.reset();
    }
}
