//! Sequence Barrier Implementation
//!
//! This module provides sequence barriers for coordinating dependencies between
//! event processors in the Disruptor pattern. Sequence barriers ensure that
//! consumers don't process events until their dependencies have been satisfied.

use crate::disruptor::{
    DisruptorError, FixedSequenceGroup, Result, Sequence, Sequencer, WaitStrategy,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Coordination barrier for managing dependencies between event processors
pub trait SequenceBarrier: Send + Sync {
    /// Wait for the given sequence to become available
    ///
    /// Blocks until the producer cursor and every dependent sequence have
    /// reached `sequence`.
    ///
    /// # Returns
    /// The highest contiguous published sequence, which may be higher than
    /// requested. A value lower than `sequence` means nothing new is readable yet.
    ///
    /// # Errors
    /// `Alert` if the barrier is alerted, `Timeout` if the wait strategy timed out
    fn wait_for(&self, sequence: i64) -> Result<i64>;

    /// Current value of the dependent sequence (monitoring only)
    fn get_cursor(&self) -> i64;

    /// Check if this barrier has been alerted
    fn is_alerted(&self) -> bool;

    /// Alert this barrier and wake every waiting thread. Idempotent.
    fn alert(&self);

    /// Clear the alert status so the barrier can be waited on again
    fn clear_alert(&self);

    /// Return `Err(Alert)` if the barrier has been alerted
    fn check_alert(&self) -> Result<()> {
        if self.is_alerted() {
            Err(DisruptorError::Alert)
        } else {
            Ok(())
        }
    }
}

/// Barrier over a sequencer's cursor and an optional set of upstream sequences
///
/// With no dependent sequences the barrier waits on the cursor alone; with
/// one or more it waits on their minimum.
pub struct ProcessingSequenceBarrier {
    sequencer: Arc<dyn Sequencer>,
    wait_strategy: Arc<dyn WaitStrategy>,
    cursor: Arc<Sequence>,
    dependent_sequence: FixedSequenceGroup,
    alerted: AtomicBool,
}

impl ProcessingSequenceBarrier {
    /// Create a new processing sequence barrier
    ///
    /// # Arguments
    /// * `sequencer` - The sequencer whose cursor and wait strategy gate this barrier
    /// * `dependent_sequences` - Sequences of upstream processors; empty for the
    ///   first stage of a pipeline
    pub fn new(sequencer: Arc<dyn Sequencer>, dependent_sequences: Vec<Arc<Sequence>>) -> Self {
        let cursor = sequencer.cursor_sequence();
        let dependent_sequence = if dependent_sequences.is_empty() {
            FixedSequenceGroup::new(vec![Arc::clone(&cursor)])
        } else {
            FixedSequenceGroup::new(dependent_sequences)
        };

        Self {
            wait_strategy: sequencer.wait_strategy(),
            sequencer,
            cursor,
            dependent_sequence,
            alerted: AtomicBool::new(false),
        }
    }
}

impl SequenceBarrier for ProcessingSequenceBarrier {
    fn wait_for(&self, sequence: i64) -> Result<i64> {
        self.check_alert()?;

        let available_sequence =
            self.wait_strategy
                .wait_for(sequence, &self.cursor, &self.dependent_sequence, self)?;

        if available_sequence < sequence {
            return Ok(available_sequence);
        }

        Ok(self
            .sequencer
            .get_highest_published_sequence(sequence, available_sequence))
    }

    fn get_cursor(&self) -> i64 {
        self.dependent_sequence.get()
    }

    fn is_alerted(&self) -> bool {
        self.alerted.load(Ordering::Acquire)
    }

    fn alert(&self) {
        self.alerted.store(true, Ordering::Release);
        self.wait_strategy.signal_all_when_blocking();
    }

    fn clear_alert(&self) {
        self.alerted.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for ProcessingSequenceBarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingSequenceBarrier")
            .field("cursor", &self.cursor)
            .field("dependent_sequence", &self.dependent_sequence.get())
            .field("alerted", &self.is_alerted())
            .finish()
    }
}
