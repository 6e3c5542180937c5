//! Event Handler Implementation
//!
//! This module provides the EventHandler trait consumed by
//! [`BatchEventProcessor`](crate::disruptor::BatchEventProcessor), together with
//! the [`HandlerHooks`] descriptor that declares which optional callbacks a
//! handler wants.

use crate::disruptor::{Result, Sequence};
use std::marker::PhantomData;
use std::sync::Arc;

/// Optional callbacks a handler opts into
///
/// Read once when the processor is constructed; callbacks whose flag is off
/// are never invoked, whatever the handler implements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerHooks {
    /// `on_start` and `on_shutdown`
    pub lifecycle: bool,
    /// `on_batch_start`
    pub batch_start: bool,
    /// `on_timeout`
    pub timeout: bool,
    /// `set_sequence_callback`
    pub sequence_reporting: bool,
}

impl HandlerHooks {
    /// No optional callbacks
    pub const NONE: Self = Self {
        lifecycle: false,
        batch_start: false,
        timeout: false,
        sequence_reporting: false,
    };

    pub const fn with_lifecycle(mut self) -> Self {
        self.lifecycle = true;
        self
    }

    pub const fn with_batch_start(mut self) -> Self {
        self.batch_start = true;
        self
    }

    pub const fn with_timeout(mut self) -> Self {
        self.timeout = true;
        self
    }

    pub const fn with_sequence_reporting(mut self) -> Self {
        self.sequence_reporting = true;
        self
    }
}

/// Handler for processing events from the ring buffer
///
/// Only [`on_event`](EventHandler::on_event) is required. The remaining
/// callbacks are invoked only when announced through
/// [`hooks`](EventHandler::hooks).
///
/// # Type Parameters
/// * `T` - The event type that will be processed
///
/// # Examples
/// ```
/// use ringlane::disruptor::{EventHandler, Result};
/// use std::sync::atomic::{AtomicI64, Ordering};
///
/// #[derive(Default)]
/// struct PriceEvent {
///     price: AtomicI64,
/// }
///
/// struct SumHandler {
///     total: i64,
/// }
///
/// impl EventHandler<PriceEvent> for SumHandler {
///     fn on_event(&mut self, event: &PriceEvent, _sequence: i64, _end_of_batch: bool) -> Result<()> {
///         self.total += event.price.load(Ordering::Acquire);
///         Ok(())
///     }
/// }
/// ```
pub trait EventHandler<T>: Send {
    /// Process an event
    ///
    /// # Arguments
    /// * `event` - The published event
    /// * `sequence` - The sequence number of the event in the ring buffer
    /// * `end_of_batch` - True if this is the last event in the current batch
    ///
    /// # Errors
    /// Any error is routed to the processor's exception handler and the
    /// processor moves on to the next sequence.
    fn on_event(&mut self, event: &T, sequence: i64, end_of_batch: bool) -> Result<()>;

    /// Which optional callbacks this handler wants
    fn hooks(&self) -> HandlerHooks {
        HandlerHooks::NONE
    }

    /// Called once on the processor thread before the first event
    fn on_start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called once on the processor thread after the last event
    fn on_shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called before each non-empty batch with the number of events in it
    fn on_batch_start(&mut self, _batch_size: i64) {}

    /// Called when the wait strategy times out
    ///
    /// # Arguments
    /// * `sequence` - The processor's current sequence
    fn on_timeout(&mut self, _sequence: i64) -> Result<()> {
        Ok(())
    }

    /// Receive the processor's own sequence
    ///
    /// Setting it mid-batch releases the processed prefix to downstream
    /// consumers before the batch completes.
    fn set_sequence_callback(&mut self, _sequence_callback: Arc<Sequence>) {}
}

/// A simple event handler that can be created from a closure
///
/// # Type Parameters
/// * `T` - The event type
/// * `F` - The closure type
pub struct ClosureEventHandler<T, F>
where
    F: FnMut(&T, i64, bool) -> Result<()> + Send,
{
    handler: F,
    _phantom: PhantomData<fn(&T)>,
}

impl<T, F> ClosureEventHandler<T, F>
where
    F: FnMut(&T, i64, bool) -> Result<()> + Send,
{
    /// Create a new closure-based event handler
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<T, F> EventHandler<T> for ClosureEventHandler<T, F>
where
    F: FnMut(&T, i64, bool) -> Result<()> + Send,
{
    fn on_event(&mut self, event: &T, sequence: i64, end_of_batch: bool) -> Result<()> {
        (self.handler)(event, sequence, end_of_batch)
    }
}

/// A no-op event handler
///
/// Useful for measuring the overhead of the coordination machinery itself.
pub struct NoOpEventHandler<T> {
    _phantom: PhantomData<fn(&T)>,
}

impl<T> NoOpEventHandler<T> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T> Default for NoOpEventHandler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventHandler<T> for NoOpEventHandler<T> {
    fn on_event(&mut self, _event: &T, _sequence: i64, _end_of_batch: bool) -> Result<()> {
        Ok(())
    }
}
