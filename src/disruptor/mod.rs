//! Ringlane Disruptor Core
//!
//! Sequencing and coordination machinery for handing pre-allocated event slots
//! between threads: sequences, single/multi producer sequencers, consumer
//! barriers, wait strategies and the batch event processor.

pub mod backoff;
pub mod config;
pub mod core_interfaces;
pub mod event_factory;
pub mod event_handler;
pub mod event_processor;
pub mod exception_handler;
pub mod producer_type;
pub mod ring_buffer;
pub mod sequence;
pub mod sequence_barrier;
pub mod sequencer;
pub mod wait_strategy;

#[cfg(test)]
mod property_tests;

pub use backoff::{BackoffPolicy, SleepBackoff, SpinBackoff, YieldBackoff};
pub use config::{SequencerConfig, WaitStrategyConfig};
pub use core_interfaces::{Cursored, DataProvider, Sequenced};
pub use event_factory::{ClosureEventFactory, DefaultEventFactory, EventFactory};
pub use event_handler::{ClosureEventHandler, EventHandler, HandlerHooks, NoOpEventHandler};
pub use event_processor::{BatchEventProcessor, EventProcessor};
pub use exception_handler::{
    ClosureExceptionHandler, ExceptionHandler, FatalExceptionHandler, LoggingExceptionHandler,
};
pub use producer_type::ProducerType;
pub use ring_buffer::RingBuffer;
pub use sequence::{get_minimum_sequence, FixedSequenceGroup, Sequence};
pub use sequence_barrier::{ProcessingSequenceBarrier, SequenceBarrier};
pub use sequencer::{MultiProducerSequencer, Sequencer, SingleProducerSequencer};
pub use wait_strategy::{
    BlockingWaitStrategy, BusySpinWaitStrategy, SleepingWaitStrategy,
    TimeoutBlockingWaitStrategy, WaitStrategy, YieldingWaitStrategy,
};

/// The initial cursor value for sequences
pub const INITIAL_CURSOR_VALUE: i64 = -1;

/// Errors that can occur in the Disruptor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisruptorError {
    /// A claim was requested for fewer than one slot, or for more than the buffer holds
    #[error("Claim count must be > 0 and <= buffer size, got: {0}")]
    InvalidArgument(i64),

    /// Non-blocking claim could not be satisfied without overtaking a gating sequence
    #[error("Insufficient capacity in ring buffer")]
    InsufficientCapacity,

    /// The barrier was alerted while waiting
    #[error("Sequence barrier alerted")]
    Alert,

    /// A timeout-capable wait strategy gave up waiting
    #[error("Timeout waiting for sequence")]
    Timeout,

    /// `run` was called on a processor that is already running
    #[error("Event processor is already running")]
    AlreadyRunning,

    #[error("Buffer size must be a power of 2, got: {0}")]
    InvalidBufferSize(usize),

    /// A user-supplied handler reported a failure
    #[error("Handler failed: {0}")]
    Handler(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DisruptorError {
    /// Convenience constructor for handler failures
    pub fn handler(message: impl Into<String>) -> Self {
        DisruptorError::Handler(message.into())
    }
}

pub type Result<T> = std::result::Result<T, DisruptorError>;

/// Utility function to check if a number is a power of 2
pub fn is_power_of_two(n: usize) -> bool {
    n != 0 && (n & (n - 1)) == 0
}

/// Base-2 logarithm of a power of two
pub fn log2(n: usize) -> u32 {
    n.trailing_zeros()
}
