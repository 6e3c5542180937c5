//! `Ringlane` - Disruptor Sequencing Core
//!
//! Lock-free coordination for handing pre-allocated event slots from producer
//! threads to consumer threads in a fixed-size ring, in the style of the LMAX
//! Disruptor.
//!
//! ## Features
//!
//! - **Single and multi producer sequencers**: claim one or many slots, blocking
//!   or non-blocking, and publish them individually or as a range
//! - **Gating**: producers never overtake the slowest registered consumer
//! - **Dependency chains**: barriers wait on the cursor or on upstream consumers
//! - **Pluggable waiting**: blocking, timeout-bounded, sleeping, yielding and
//!   busy-spin wait strategies
//! - **Batch processing**: one progress update per batch, with per-event fault
//!   isolation
//!
//! ## Quick Start
//!
//! ```rust
//! use ringlane::disruptor::{
//!     BatchEventProcessor, BlockingWaitStrategy, ClosureEventHandler, DataProvider,
//!     DefaultEventFactory, EventProcessor, ProcessingSequenceBarrier, RingBuffer,
//!     Sequenced, Sequencer, SingleProducerSequencer,
//! };
//! use std::sync::atomic::{AtomicI64, Ordering};
//! use std::sync::Arc;
//! use std::thread;
//!
//! #[derive(Default)]
//! struct ValueEvent {
//!     value: AtomicI64,
//! }
//!
//! let ring_buffer = Arc::new(RingBuffer::new(64, DefaultEventFactory::<ValueEvent>::new())?);
//! let sequencer = Arc::new(SingleProducerSequencer::new(64, Arc::new(BlockingWaitStrategy::new()))?);
//! let barrier = Arc::new(ProcessingSequenceBarrier::new(sequencer.clone(), vec![]));
//!
//! let total = Arc::new(AtomicI64::new(0));
//! let data_provider: Arc<dyn DataProvider<ValueEvent>> = ring_buffer.clone();
//! let processor = Arc::new(BatchEventProcessor::new(data_provider, barrier, {
//!     let total = total.clone();
//!     ClosureEventHandler::new(move |event: &ValueEvent, _sequence, _end_of_batch| {
//!         total.fetch_add(event.value.load(Ordering::Acquire), Ordering::AcqRel);
//!         Ok(())
//!     })
//! }));
//! sequencer.add_gating_sequences(&[processor.get_sequence()]);
//!
//! let worker = {
//!     let processor = processor.clone();
//!     thread::spawn(move || processor.run())
//! };
//!
//! for i in 1..=10 {
//!     let seq = sequencer.next()?;
//!     ring_buffer.get(seq).value.store(i, Ordering::Release);
//!     sequencer.publish(seq);
//! }
//!
//! while processor.get_sequence().get() < 9 {
//!     thread::yield_now();
//! }
//! processor.halt();
//! worker.join().unwrap()?;
//! assert_eq!(total.load(Ordering::Acquire), 55);
//! # Ok::<(), ringlane::DisruptorError>(())
//! ```
//!
//! ## Architecture
//!
//! - **`Sequence`**: padded atomic counter, the unit of progress
//! - **`Sequencer`**: hands out slots and records publication
//! - **`SequenceBarrier`**: where consumers wait, and where they are alerted
//! - **`WaitStrategy`**: how they wait
//! - **`BatchEventProcessor`**: the consumer loop driving an `EventHandler`
//! - **`RingBuffer`**: the default pre-allocated event storage

pub mod disruptor;

// Re-export the main types for convenience
pub use disruptor::{
    // Utility functions
    is_power_of_two,
    // Event processing
    BatchEventProcessor,
    // Wait strategies
    BlockingWaitStrategy,
    BusySpinWaitStrategy,
    DataProvider,
    DefaultEventFactory,
    // Error types
    DisruptorError,
    EventFactory,
    // Event handling
    EventHandler,
    EventProcessor,
    ExceptionHandler,
    HandlerHooks,
    MultiProducerSequencer,
    ProcessingSequenceBarrier,
    ProducerType,
    Result,
    RingBuffer,
    // Sequencing
    Sequence,
    SequenceBarrier,
    Sequenced,
    Sequencer,
    // Configuration
    SequencerConfig,
    SingleProducerSequencer,
    SleepingWaitStrategy,
    TimeoutBlockingWaitStrategy,
    WaitStrategy,
    WaitStrategyConfig,
    YieldingWaitStrategy,
    // Constants
    INITIAL_CURSOR_VALUE,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the version of the `Ringlane` library
#[must_use]
pub fn version() -> &'static str {
    VERSION
}
