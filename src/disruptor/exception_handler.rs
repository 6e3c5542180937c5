//! Exception Handler Implementation
//!
//! This module provides exception handling for the batch event processor.
//! Exception handlers are called when an event handler or one of its
//! lifecycle hooks fails, so the processor thread itself never dies from a
//! handler fault.

use crate::disruptor::DisruptorError;
use std::marker::PhantomData;

/// Handler for failures raised while processing events
///
/// # Type Parameters
/// * `T` - The event type being processed
pub trait ExceptionHandler<T>: Send + Sync {
    /// Handle a failure raised while processing the event at `sequence`
    ///
    /// # Arguments
    /// * `error` - The error that occurred
    /// * `sequence` - The sequence being processed
    /// * `event` - The event, or `None` when the failure did not come from a
    ///   specific event (a timeout notification, for instance)
    fn handle_event_exception(&self, error: DisruptorError, sequence: i64, event: Option<&T>);

    /// Handle a failure raised by the handler's start hook
    fn handle_on_start_exception(&self, error: DisruptorError);

    /// Handle a failure raised by the handler's shutdown hook
    fn handle_on_shutdown_exception(&self, error: DisruptorError);
}

/// Default exception handler: an event failure is fatal
///
/// Logs the failure at error level and then panics, taking the processor
/// thread down with it. Lifecycle failures are logged only.
#[derive(Debug, Default, Clone, Copy)]
pub struct FatalExceptionHandler;

impl FatalExceptionHandler {
    pub fn new() -> Self {
        Self
    }
}

impl<T> ExceptionHandler<T> for FatalExceptionHandler {
    fn handle_event_exception(&self, error: DisruptorError, sequence: i64, event: Option<&T>) {
        tracing::error!(sequence, %error, has_event = event.is_some(), "fatal exception processing event");
        panic!("fatal exception processing event at sequence {sequence}: {error}");
    }

    fn handle_on_start_exception(&self, error: DisruptorError) {
        tracing::error!(%error, "exception during event processor start");
    }

    fn handle_on_shutdown_exception(&self, error: DisruptorError) {
        tracing::error!(%error, "exception during event processor shutdown");
    }
}

/// Exception handler that logs every failure and lets processing continue
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingExceptionHandler;

impl LoggingExceptionHandler {
    pub fn new() -> Self {
        Self
    }
}

impl<T> ExceptionHandler<T> for LoggingExceptionHandler {
    fn handle_event_exception(&self, error: DisruptorError, sequence: i64, event: Option<&T>) {
        tracing::warn!(sequence, %error, has_event = event.is_some(), "exception processing event");
    }

    fn handle_on_start_exception(&self, error: DisruptorError) {
        tracing::warn!(%error, "exception during event processor start");
    }

    fn handle_on_shutdown_exception(&self, error: DisruptorError) {
        tracing::warn!(%error, "exception during event processor shutdown");
    }
}

/// Closure-based exception handler
///
/// # Type Parameters
/// * `T` - The event type
/// * `F` - The closure type for event exceptions
/// * `S` - The closure type for startup exceptions
/// * `H` - The closure type for shutdown exceptions
pub struct ClosureExceptionHandler<T, F, S, H>
where
    F: Fn(DisruptorError, i64, Option<&T>) + Send + Sync,
    S: Fn(DisruptorError) + Send + Sync,
    H: Fn(DisruptorError) + Send + Sync,
{
    event_handler: F,
    start_handler: S,
    shutdown_handler: H,
    _phantom: PhantomData<fn(&T)>,
}

impl<T, F, S, H> ClosureExceptionHandler<T, F, S, H>
where
    F: Fn(DisruptorError, i64, Option<&T>) + Send + Sync,
    S: Fn(DisruptorError) + Send + Sync,
    H: Fn(DisruptorError) + Send + Sync,
{
    /// Create a new closure-based exception handler
    ///
    /// # Arguments
    /// * `event_handler` - Closure for event processing failures
    /// * `start_handler` - Closure for start hook failures
    /// * `shutdown_handler` - Closure for shutdown hook failures
    pub fn new(event_handler: F, start_handler: S, shutdown_handler: H) -> Self {
        Self {
            event_handler,
            start_handler,
            shutdown_handler,
            _phantom: PhantomData,
        }
    }
}

impl<T, F, S, H> ExceptionHandler<T> for ClosureExceptionHandler<T, F, S, H>
where
    F: Fn(DisruptorError, i64, Option<&T>) + Send + Sync,
    S: Fn(DisruptorError) + Send + Sync,
    H: Fn(DisruptorError) + Send + Sync,
{
    fn handle_event_exception(&self, error: DisruptorError, sequence: i64, event: Option<&T>) {
        (self.event_handler)(error, sequence, event);
    }

    fn handle_on_start_exception(&self, error: DisruptorError) {
        (self.start_handler)(error);
    }

    fn handle_on_shutdown_exception(&self, error: DisruptorError) {
        (self.shutdown_handler)(error);
    }
}
