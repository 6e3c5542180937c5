//! Core Interfaces for the Disruptor Pattern
//!
//! This module defines the fundamental interfaces that form the backbone
//! of the Disruptor: cursor access, sequencing operations, and data access.

use crate::disruptor::Result;

/// Provides access to a cursor value
pub trait Cursored {
    /// Get the current cursor value
    ///
    /// For a single producer this is the highest published sequence; for
    /// multiple producers it is the highest claimed sequence.
    fn get_cursor(&self) -> i64;
}

/// Operations related to sequencing items in a ring buffer
pub trait Sequenced {
    /// Get the capacity of the data structure
    fn get_buffer_size(&self) -> usize;

    /// Check if the buffer has capacity for `required_capacity` more sequences
    ///
    /// This is a concurrent method, so the response should only be taken
    /// as an indication of available capacity.
    fn has_available_capacity(&self, required_capacity: i64) -> bool;

    /// Get the remaining capacity for this sequencer
    ///
    /// Advisory only; may be stale as soon as it returns.
    fn remaining_capacity(&self) -> i64;

    /// Claim the next sequence, waiting for capacity if necessary
    fn next(&self) -> Result<i64> {
        self.next_n(1)
    }

    /// Claim the next n sequences, waiting for capacity if necessary
    ///
    /// Batch producing looks like this:
    ///
    /// ```ignore
    /// let n = 10;
    /// let hi = sequencer.next_n(n)?;
    /// let lo = hi - (n - 1);
    /// for sequence in lo..=hi {
    ///     // write the slot at `sequence`
    /// }
    /// sequencer.publish_range(lo, hi);
    /// ```
    ///
    /// # Errors
    /// `InvalidArgument` if `n < 1` or `n` exceeds the buffer size.
    fn next_n(&self, n: i64) -> Result<i64>;

    /// Claim the next sequence without waiting
    fn try_next(&self) -> Result<i64> {
        self.try_next_n(1)
    }

    /// Claim the next n sequences without waiting
    ///
    /// # Errors
    /// `InvalidArgument` if `n < 1` or `n` exceeds the buffer size; `InsufficientCapacity` if the claim would
    /// overtake the slowest gating sequence. A failed claim leaves no trace.
    fn try_next_n(&self, n: i64) -> Result<i64>;

    /// Publish a sequence; call once the slot has been filled
    fn publish(&self, sequence: i64);

    /// Publish the contiguous range `lo..=hi`
    fn publish_range(&self, lo: i64, hi: i64);
}

/// Indexed access to the externally owned event storage
///
/// Implementations map any sequence to a slot via `sequence & (size - 1)`.
pub trait DataProvider<T>: Send + Sync {
    /// Get the data item at the specified sequence
    fn get(&self, sequence: i64) -> &T;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCursored {
        cursor: i64,
    }

    impl Cursored for TestCursored {
        fn get_cursor(&self) -> i64 {
            self.cursor
        }
    }

    struct TestDataProvider {
        data: Vec<i32>,
    }

    impl DataProvider<i32> for TestDataProvider {
        fn get(&self, sequence: i64) -> &i32 {
            &self.data[sequence as usize & (self.data.len() - 1)]
        }
    }

    #[test]
    fn test_cursored_trait() {
        let cursored = TestCursored { cursor: 42 };
        assert_eq!(cursored.get_cursor(), 42);
    }

    #[test]
    fn test_data_provider_trait() {
        let provider = TestDataProvider {
            data: vec![1, 2, 3, 4],
        };

        assert_eq!(*provider.get(0), 1);
        assert_eq!(*provider.get(2), 3);
        assert_eq!(*provider.get(6), 3);
    }
}
