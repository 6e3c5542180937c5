//! Sequence implementation for the Disruptor
//!
//! The Sequence is used to track progress through the ring buffer and coordinate
//! between producers and consumers. It provides atomic operations while preventing
//! false sharing through careful memory layout.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Cache line padding applied around every sequence value
///
/// Two lines, so the adjacent-line prefetcher never pulls a neighbouring
/// counter into the same pair.
const CACHE_LINE_SIZE: usize = 128;

/// A sequence number that prevents false sharing
///
/// The value occupies its own pair of cache lines; the struct alignment
/// guarantees no other concurrently-written variable is placed next to it.
#[repr(align(128))]
pub struct Sequence {
    /// The actual sequence value
    value: AtomicI64,
    _padding: [u8; CACHE_LINE_SIZE - std::mem::size_of::<AtomicI64>()],
}

impl Sequence {
    /// Create a new sequence with the given initial value
    pub fn new(initial_value: i64) -> Self {
        Self {
            value: AtomicI64::new(initial_value),
            _padding: [0; CACHE_LINE_SIZE - std::mem::size_of::<AtomicI64>()],
        }
    }

    /// Get the current sequence value
    #[inline]
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    /// Ordered store; everything written before it is visible to readers that observe the value
    #[inline]
    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::Release);
    }

    /// Sequentially consistent store (store/load fence)
    #[inline]
    pub fn set_volatile(&self, value: i64) {
        self.value.store(value, Ordering::SeqCst);
    }

    /// Atomically set the value to `new` if it currently equals `expected`
    #[inline]
    pub fn compare_and_set(&self, expected: i64, new: i64) -> bool {
        self.value
            .compare_exchange(expected, new, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Increment and get the new value
    #[inline]
    pub fn increment_and_get(&self) -> i64 {
        self.add_and_get(1)
    }

    /// Add a value and get the new result
    #[inline]
    pub fn add_and_get(&self, increment: i64) -> i64 {
        self.value.fetch_add(increment, Ordering::AcqRel) + increment
    }

    /// Get the current value and then add
    #[inline]
    pub fn get_and_add(&self, increment: i64) -> i64 {
        self.value.fetch_add(increment, Ordering::AcqRel)
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new(crate::disruptor::INITIAL_CURSOR_VALUE)
    }
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("value", &self.get())
            .finish()
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Minimum value over `sequences`, or `minimum` if that is lower (or the slice is empty)
pub fn get_minimum_sequence(sequences: &[Arc<Sequence>], minimum: i64) -> i64 {
    sequences
        .iter()
        .map(|seq| seq.get())
        .fold(minimum, i64::min)
}

/// A fixed set of sequences read as one: `get()` is their pointwise minimum
///
/// Used as the dependent sequence of a barrier. A group of one reads straight
/// through to that sequence.
#[derive(Debug, Clone)]
pub struct FixedSequenceGroup {
    sequences: Box<[Arc<Sequence>]>,
}

impl FixedSequenceGroup {
    /// Create a group over the given sequences
    ///
    /// # Panics
    /// Panics if `sequences` is empty; a barrier always has at least its cursor.
    pub fn new(sequences: Vec<Arc<Sequence>>) -> Self {
        assert!(!sequences.is_empty(), "sequence group must not be empty");
        Self {
            sequences: sequences.into_boxed_slice(),
        }
    }

    /// Get the minimum value over the group
    #[inline]
    pub fn get(&self) -> i64 {
        match &*self.sequences {
            [only] => only.get(),
            sequences => get_minimum_sequence(sequences, i64::MAX),
        }
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn sequences(&self) -> &[Arc<Sequence>] {
        &self.sequences
    }
}
