//! Ring Buffer Implementation
//!
//! A pre-allocated, power-of-two sized array of events. The buffer itself
//! holds no coordination state: which slots may be written or read is decided
//! entirely by a [`Sequencer`](crate::disruptor::Sequencer) and its barriers.

use crate::disruptor::core_interfaces::DataProvider;
use crate::disruptor::{is_power_of_two, DisruptorError, EventFactory, Result};
use std::cell::UnsafeCell;

/// Pre-allocated event storage indexed by sequence
///
/// # Type Parameters
/// * `T` - The event type stored in the buffer
#[derive(Debug)]
pub struct RingBuffer<T> {
    slots: Box<[UnsafeCell<T>]>,
    /// `buffer_size - 1`, as i64 to match the sequence type
    index_mask: i64,
}

impl<T> RingBuffer<T> {
    /// Create a ring buffer and fill every slot from `event_factory`
    ///
    /// # Errors
    /// Returns `DisruptorError::InvalidBufferSize` if buffer_size is not a power of 2
    pub fn new<F>(buffer_size: usize, event_factory: F) -> Result<Self>
    where
        F: EventFactory<T>,
    {
        if !is_power_of_two(buffer_size) {
            return Err(DisruptorError::InvalidBufferSize(buffer_size));
        }

        let slots: Box<[UnsafeCell<T>]> = (0..buffer_size)
            .map(|_| UnsafeCell::new(event_factory.new_instance()))
            .collect();

        Ok(Self {
            slots,
            index_mask: (buffer_size - 1) as i64,
        })
    }

    #[inline]
    fn index(&self, sequence: i64) -> usize {
        (sequence & self.index_mask) as usize
    }

    /// Get the event at `sequence`
    ///
    /// Any sequence is accepted; it maps to slot `sequence & (size - 1)`.
    pub fn get(&self, sequence: i64) -> &T {
        // SAFETY: the mask keeps the index in bounds; writers only touch a slot
        // they have claimed and not yet published, which no reader observes.
        unsafe { &*self.slots.get_unchecked(self.index(sequence)).get() }
    }

    /// Raw pointer to the event at `sequence`, for the producer filling it
    ///
    /// # Safety
    /// The caller must hold a claim on `sequence` that has not been published
    /// yet, and no other reference to that slot may be alive while it writes.
    pub unsafe fn get_mut_unchecked(&self, sequence: i64) -> *mut T {
        self.slots.get_unchecked(self.index(sequence)).get()
    }

    /// Get the size of the buffer
    pub fn buffer_size(&self) -> usize {
        self.slots.len()
    }
}

// SAFETY: slot access is coordinated by the sequencer: a slot is written only by
// the producer holding its claim and read only after the publish that follows.
unsafe impl<T: Send> Send for RingBuffer<T> {}
unsafe impl<T: Send + Sync> Sync for RingBuffer<T> {}

impl<T> DataProvider<T> for RingBuffer<T>
where
    T: Send + Sync,
{
    fn get(&self, sequence: i64) -> &T {
        RingBuffer::get(self, sequence)
    }
}
