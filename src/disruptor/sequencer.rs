//! Sequencer Implementation
//!
//! This module provides sequencer implementations for coordinating access to the ring buffer.
//! Sequencers manage the allocation of sequence numbers and ensure that producers don't
//! overwrite events that haven't been consumed yet.

use crate::disruptor::backoff::{BackoffPolicy, SleepBackoff};
use crate::disruptor::{
    get_minimum_sequence, is_power_of_two, log2, Cursored, DisruptorError, Result, Sequence,
    Sequenced, WaitStrategy,
};
use crossbeam_utils::CachePadded;
use parking_lot::RwLock;
use std::sync::atomic::{fence, AtomicI32, AtomicI64, Ordering};
use std::sync::Arc;

/// Coordinates claiming and publishing of ring buffer slots
///
/// Extends [`Sequenced`] with the gating and availability queries consumers and
/// barriers rely on.
pub trait Sequencer: Cursored + Sequenced + Send + Sync + std::fmt::Debug {
    /// Shared handle to the cursor sequence
    fn cursor_sequence(&self) -> Arc<Sequence>;

    /// The wait strategy consumers of this sequencer block on
    fn wait_strategy(&self) -> Arc<dyn WaitStrategy>;

    /// Force the claim position to `sequence`
    ///
    /// Only for wiring before steady state; not safe while producers are active.
    fn claim(&self, sequence: i64);

    /// Check if a sequence has been published and is safe to read
    fn is_available(&self, sequence: i64) -> bool;

    /// Add gating sequences that this sequencer must not overtake
    ///
    /// Wiring-time only; not safe concurrently with active claims.
    fn add_gating_sequences(&self, gating_sequences: &[Arc<Sequence>]);

    /// Remove a gating sequence
    ///
    /// # Returns
    /// True if the sequence was found and removed
    fn remove_gating_sequence(&self, sequence: &Arc<Sequence>) -> bool;

    /// Minimum over the gating sequences, or the cursor when there are none
    fn get_minimum_sequence(&self) -> i64;

    /// Highest `p` in `[lower_bound, available_sequence]` such that every
    /// sequence in `[lower_bound, p]` is published
    ///
    /// Returns `lower_bound - 1` when `lower_bound` itself is not published.
    fn get_highest_published_sequence(&self, lower_bound: i64, available_sequence: i64) -> i64;
}

/// State and wiring shared by both producer variants
#[derive(Debug)]
struct SequencerCore {
    buffer_size: usize,
    wait_strategy: Arc<dyn WaitStrategy>,
    cursor: Arc<Sequence>,
    gating_sequences: RwLock<Vec<Arc<Sequence>>>,
}

impl SequencerCore {
    fn new(buffer_size: usize, wait_strategy: Arc<dyn WaitStrategy>) -> Result<Self> {
        if !is_power_of_two(buffer_size) {
            return Err(DisruptorError::InvalidBufferSize(buffer_size));
        }

        Ok(Self {
            buffer_size,
            wait_strategy,
            cursor: Arc::new(Sequence::default()),
            gating_sequences: RwLock::new(Vec::new()),
        })
    }

    #[inline]
    fn size(&self) -> i64 {
        self.buffer_size as i64
    }

    fn validate_claim(&self, n: i64) -> Result<()> {
        if n < 1 || n > self.size() {
            return Err(DisruptorError::InvalidArgument(n));
        }
        Ok(())
    }

    #[inline]
    fn minimum_gating_sequence(&self, minimum: i64) -> i64 {
        get_minimum_sequence(&self.gating_sequences.read(), minimum)
    }

    fn add_gating_sequences(&self, gating_sequences: &[Arc<Sequence>]) {
        self.gating_sequences
            .write()
            .extend_from_slice(gating_sequences);
    }

    fn remove_gating_sequence(&self, sequence: &Arc<Sequence>) -> bool {
        let mut sequences = self.gating_sequences.write();
        if let Some(pos) = sequences.iter().position(|s| Arc::ptr_eq(s, sequence)) {
            sequences.remove(pos);
            true
        } else {
            false
        }
    }
}

/// Producer-owned claim state, kept off the cursor's cache lines
#[derive(Debug)]
struct ProducerState {
    /// Highest claimed sequence
    next_value: AtomicI64,
    /// Last observed minimum gating sequence
    cached_value: AtomicI64,
}

/// Single producer sequencer
///
/// Only one thread may ever call the claim and publish methods. This is not
/// checked at runtime. In exchange claiming needs no atomic read-modify-write
/// and publishing is a single ordered store of the cursor.
#[derive(Debug)]
pub struct SingleProducerSequencer {
    core: SequencerCore,
    producer: CachePadded<ProducerState>,
}

impl SingleProducerSequencer {
    /// Create a new single producer sequencer
    ///
    /// # Errors
    /// Returns `InvalidBufferSize` if `buffer_size` is not a power of 2
    pub fn new(buffer_size: usize, wait_strategy: Arc<dyn WaitStrategy>) -> Result<Self> {
        Ok(Self {
            core: SequencerCore::new(buffer_size, wait_strategy)?,
            producer: CachePadded::new(ProducerState {
                next_value: AtomicI64::new(crate::disruptor::INITIAL_CURSOR_VALUE),
                cached_value: AtomicI64::new(crate::disruptor::INITIAL_CURSOR_VALUE),
            }),
        })
    }

    fn has_capacity(&self, required_capacity: i64, do_store: bool) -> bool {
        let next_value = self.producer.next_value.load(Ordering::Relaxed);
        let wrap_point = (next_value + required_capacity) - self.core.size();
        let cached_gating_sequence = self.producer.cached_value.load(Ordering::Relaxed);

        // The second condition should never hold; it only guards against a regressed cache.
        if wrap_point > cached_gating_sequence || cached_gating_sequence > next_value {
            if do_store {
                fence(Ordering::SeqCst);
            }

            let min_sequence = self.core.minimum_gating_sequence(next_value);
            self.producer
                .cached_value
                .store(min_sequence, Ordering::Relaxed);

            if wrap_point > min_sequence {
                return false;
            }
        }

        true
    }
}

impl Cursored for SingleProducerSequencer {
    fn get_cursor(&self) -> i64 {
        self.core.cursor.get()
    }
}

impl Sequenced for SingleProducerSequencer {
    fn get_buffer_size(&self) -> usize {
        self.core.buffer_size
    }

    fn has_available_capacity(&self, required_capacity: i64) -> bool {
        self.has_capacity(required_capacity, false)
    }

    fn remaining_capacity(&self) -> i64 {
        let next_value = self.producer.next_value.load(Ordering::Relaxed);
        let consumed = self.core.minimum_gating_sequence(next_value);
        self.core.size() - (next_value - consumed)
    }

    fn next_n(&self, n: i64) -> Result<i64> {
        self.core.validate_claim(n)?;

        let next_value = self.producer.next_value.load(Ordering::Relaxed);
        let next_sequence = next_value + n;
        let wrap_point = next_sequence - self.core.size();
        let cached_gating_sequence = self.producer.cached_value.load(Ordering::Relaxed);

        if wrap_point > cached_gating_sequence || cached_gating_sequence > next_value {
            fence(Ordering::SeqCst);

            let mut backoff = SleepBackoff::parking();
            let mut min_sequence = self.core.minimum_gating_sequence(next_value);
            if wrap_point > min_sequence {
                tracing::trace!(wrap_point, min_sequence, "producer waiting for capacity");
                while wrap_point > min_sequence {
                    backoff.backoff();
                    min_sequence = self.core.minimum_gating_sequence(next_value);
                }
            }

            self.producer
                .cached_value
                .store(min_sequence, Ordering::Relaxed);
        }

        self.producer
            .next_value
            .store(next_sequence, Ordering::Relaxed);

        Ok(next_sequence)
    }

    fn try_next_n(&self, n: i64) -> Result<i64> {
        self.core.validate_claim(n)?;

        if !self.has_capacity(n, true) {
            return Err(DisruptorError::InsufficientCapacity);
        }

        let next_sequence = self.producer.next_value.load(Ordering::Relaxed) + n;
        self.producer
            .next_value
            .store(next_sequence, Ordering::Relaxed);

        Ok(next_sequence)
    }

    fn publish(&self, sequence: i64) {
        self.core.cursor.set(sequence);
        self.core.wait_strategy.signal_all_when_blocking();
    }

    fn publish_range(&self, _low: i64, high: i64) {
        self.publish(high);
    }
}

impl Sequencer for SingleProducerSequencer {
    fn cursor_sequence(&self) -> Arc<Sequence> {
        Arc::clone(&self.core.cursor)
    }

    fn wait_strategy(&self) -> Arc<dyn WaitStrategy> {
        Arc::clone(&self.core.wait_strategy)
    }

    fn claim(&self, sequence: i64) {
        self.producer.next_value.store(sequence, Ordering::Relaxed);
    }

    fn is_available(&self, sequence: i64) -> bool {
        sequence <= self.core.cursor.get()
    }

    fn add_gating_sequences(&self, gating_sequences: &[Arc<Sequence>]) {
        self.core.add_gating_sequences(gating_sequences);
    }

    fn remove_gating_sequence(&self, sequence: &Arc<Sequence>) -> bool {
        self.core.remove_gating_sequence(sequence)
    }

    fn get_minimum_sequence(&self) -> i64 {
        self.core.minimum_gating_sequence(self.core.cursor.get())
    }

    fn get_highest_published_sequence(&self, _lower_bound: i64, available_sequence: i64) -> i64 {
        available_sequence
    }
}

/// Multi producer sequencer
///
/// Any number of threads may claim and publish concurrently. Claims race on
/// the cursor with compare-and-set; publication is recorded per slot in an
/// availability buffer holding the lap (`sequence >> log2(buffer_size)`) that
/// last published it, because producers may finish out of claim order.
pub struct MultiProducerSequencer {
    core: SequencerCore,
    /// Shared cache of the minimum gating sequence
    gating_sequence_cache: Sequence,
    available_buffer: Box<[AtomicI32]>,
    index_mask: i64,
    index_shift: u32,
}

impl MultiProducerSequencer {
    /// Create a new multi producer sequencer
    ///
    /// # Errors
    /// Returns `InvalidBufferSize` if `buffer_size` is not a power of 2
    pub fn new(buffer_size: usize, wait_strategy: Arc<dyn WaitStrategy>) -> Result<Self> {
        let core = SequencerCore::new(buffer_size, wait_strategy)?;

        let available_buffer: Box<[AtomicI32]> =
            (0..buffer_size).map(|_| AtomicI32::new(-1)).collect();

        Ok(Self {
            core,
            gating_sequence_cache: Sequence::default(),
            available_buffer,
            index_mask: (buffer_size - 1) as i64,
            index_shift: log2(buffer_size),
        })
    }

    fn has_capacity(&self, required_capacity: i64, cursor_value: i64) -> bool {
        let wrap_point = (cursor_value + required_capacity) - self.core.size();
        let cached_gating_sequence = self.gating_sequence_cache.get();

        // The second condition should never hold; it only guards against a regressed cache.
        if wrap_point > cached_gating_sequence || cached_gating_sequence > cursor_value {
            let min_sequence = self.core.minimum_gating_sequence(cursor_value);
            self.gating_sequence_cache.set(min_sequence);

            if wrap_point > min_sequence {
                return false;
            }
        }

        true
    }

    #[inline]
    fn calculate_index(&self, sequence: i64) -> usize {
        (sequence & self.index_mask) as usize
    }

    #[inline]
    fn calculate_availability_flag(&self, sequence: i64) -> i32 {
        (sequence >> self.index_shift) as i32
    }

    #[inline]
    fn set_available(&self, sequence: i64) {
        let index = self.calculate_index(sequence);
        let flag = self.calculate_availability_flag(sequence);
        self.available_buffer[index].store(flag, Ordering::Release);
    }
}

impl std::fmt::Debug for MultiProducerSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiProducerSequencer")
            .field("buffer_size", &self.core.buffer_size)
            .field("cursor", &self.core.cursor)
            .field("gating_sequence_cache", &self.gating_sequence_cache)
            .field("wait_strategy", &self.core.wait_strategy)
            .finish()
    }
}

impl Cursored for MultiProducerSequencer {
    fn get_cursor(&self) -> i64 {
        self.core.cursor.get()
    }
}

impl Sequenced for MultiProducerSequencer {
    fn get_buffer_size(&self) -> usize {
        self.core.buffer_size
    }

    fn has_available_capacity(&self, required_capacity: i64) -> bool {
        self.has_capacity(required_capacity, self.core.cursor.get())
    }

    fn remaining_capacity(&self) -> i64 {
        let produced = self.core.cursor.get();
        let consumed = self.core.minimum_gating_sequence(produced);
        self.core.size() - (produced - consumed)
    }

    fn next_n(&self, n: i64) -> Result<i64> {
        self.core.validate_claim(n)?;

        let mut backoff = SleepBackoff::parking();
        loop {
            let current = self.core.cursor.get();
            let next = current + n;

            let wrap_point = next - self.core.size();
            let cached_gating_sequence = self.gating_sequence_cache.get();

            if wrap_point > cached_gating_sequence || cached_gating_sequence > current {
                let gating_sequence = self.core.minimum_gating_sequence(current);

                if wrap_point > gating_sequence {
                    tracing::trace!(wrap_point, gating_sequence, "producer waiting for capacity");
                    backoff.backoff();
                    continue;
                }

                self.gating_sequence_cache.set(gating_sequence);
            } else if self.core.cursor.compare_and_set(current, next) {
                return Ok(next);
            }
        }
    }

    fn try_next_n(&self, n: i64) -> Result<i64> {
        self.core.validate_claim(n)?;

        loop {
            let current = self.core.cursor.get();
            let next = current + n;

            if !self.has_capacity(n, current) {
                return Err(DisruptorError::InsufficientCapacity);
            }

            if self.core.cursor.compare_and_set(current, next) {
                return Ok(next);
            }
        }
    }

    fn publish(&self, sequence: i64) {
        self.set_available(sequence);
        self.core.wait_strategy.signal_all_when_blocking();
    }

    fn publish_range(&self, low: i64, high: i64) {
        for sequence in low..=high {
            self.set_available(sequence);
        }
        self.core.wait_strategy.signal_all_when_blocking();
    }
}

impl Sequencer for MultiProducerSequencer {
    fn cursor_sequence(&self) -> Arc<Sequence> {
        Arc::clone(&self.core.cursor)
    }

    fn wait_strategy(&self) -> Arc<dyn WaitStrategy> {
        Arc::clone(&self.core.wait_strategy)
    }

    fn claim(&self, sequence: i64) {
        self.core.cursor.set(sequence);
    }

    fn is_available(&self, sequence: i64) -> bool {
        let index = self.calculate_index(sequence);
        let flag = self.calculate_availability_flag(sequence);
        self.available_buffer[index].load(Ordering::Acquire) == flag
    }

    fn add_gating_sequences(&self, gating_sequences: &[Arc<Sequence>]) {
        self.core.add_gating_sequences(gating_sequences);
    }

    fn remove_gating_sequence(&self, sequence: &Arc<Sequence>) -> bool {
        self.core.remove_gating_sequence(sequence)
    }

    fn get_minimum_sequence(&self) -> i64 {
        self.core.minimum_gating_sequence(self.core.cursor.get())
    }

    fn get_highest_published_sequence(&self, lower_bound: i64, available_sequence: i64) -> i64 {
        for sequence in lower_bound..=available_sequence {
            if !self.is_available(sequence) {
                return sequence - 1;
            }
        }

        available_sequence
    }
}
