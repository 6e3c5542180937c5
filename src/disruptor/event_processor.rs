//! Event Processor implementation
//!
//! Event processors drive the consumption of events. A processor owns one
//! [`Sequence`] marking how far it has got, waits on a [`SequenceBarrier`] for
//! more work and hands each available event to its handler.

use crate::disruptor::{
    DataProvider, DisruptorError, EventHandler, ExceptionHandler, FatalExceptionHandler,
    HandlerHooks, Result, Sequence, SequenceBarrier,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const IDLE: u8 = 0;
const HALTED: u8 = 1;
const RUNNING: u8 = 2;

/// An event processor runs on a caller-supplied thread until halted
pub trait EventProcessor: Send + Sync {
    /// Get the sequence tracking this processor's progress
    ///
    /// Register it as a gating sequence on the sequencer, or as a dependent
    /// sequence of a downstream barrier.
    fn get_sequence(&self) -> Arc<Sequence>;

    /// Ask the processor to stop once it has finished its current batch
    ///
    /// A halt that finds the processor idle is remembered: `is_running`
    /// reports true until the next `run`, which fires the lifecycle hooks,
    /// processes nothing and returns the processor to idle.
    fn halt(&self);

    /// True from `run` entry, or from a `halt` on an idle processor, until
    /// the processor is back to idle
    fn is_running(&self) -> bool;

    /// Run the processing loop on the calling thread until halted
    ///
    /// # Errors
    /// `AlreadyRunning` if another thread is already inside `run`
    fn run(&self) -> Result<()>;
}

/// Batch event processor
///
/// Delivers every available event to its handler in order, then publishes
/// its progress once per batch. A handler failure is routed to the exception
/// handler and costs exactly the failing event: the processor's sequence is
/// moved to the failing position and processing resumes after it.
///
/// A halted processor can be run again; it resumes after the last sequence it
/// published, so nothing is skipped or delivered twice.
pub struct BatchEventProcessor<T, H>
where
    H: EventHandler<T>,
{
    data_provider: Arc<dyn DataProvider<T>>,
    sequence_barrier: Arc<dyn SequenceBarrier>,
    event_handler: Mutex<H>,
    exception_handler: Mutex<Arc<dyn ExceptionHandler<T>>>,
    sequence: Arc<Sequence>,
    running: AtomicU8,
    hooks: HandlerHooks,
}

/// Puts the processor back to idle however `run` is left
struct IdleOnDrop<'a>(&'a AtomicU8);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(IDLE, Ordering::Release);
    }
}

/// Fires the shutdown hook once the loop is left, including by unwinding
/// out of a panicking exception handler
struct ShutdownOnDrop<'a, T, H>
where
    H: EventHandler<T>,
{
    processor: &'a BatchEventProcessor<T, H>,
    handler: &'a mut H,
}

impl<T, H> Drop for ShutdownOnDrop<'_, T, H>
where
    H: EventHandler<T>,
{
    fn drop(&mut self) {
        tracing::debug!(
            sequence = self.processor.sequence.get(),
            panicking = std::thread::panicking(),
            "batch event processor exiting"
        );
        self.processor.notify_shutdown(self.handler);
    }
}

impl<T, H> BatchEventProcessor<T, H>
where
    H: EventHandler<T>,
{
    /// Create a new batch event processor
    ///
    /// The handler's [`hooks`](EventHandler::hooks) are read here, once. A
    /// handler asking for sequence reporting receives the processor's
    /// sequence before this returns.
    ///
    /// # Arguments
    /// * `data_provider` - Storage the events are read from
    /// * `sequence_barrier` - Barrier gating this processor
    /// * `event_handler` - Handler invoked for every event
    pub fn new(
        data_provider: Arc<dyn DataProvider<T>>,
        sequence_barrier: Arc<dyn SequenceBarrier>,
        mut event_handler: H,
    ) -> Self {
        let sequence = Arc::new(Sequence::default());
        let hooks = event_handler.hooks();
        if hooks.sequence_reporting {
            event_handler.set_sequence_callback(Arc::clone(&sequence));
        }

        Self {
            data_provider,
            sequence_barrier,
            event_handler: Mutex::new(event_handler),
            exception_handler: Mutex::new(Arc::new(FatalExceptionHandler::new())),
            sequence,
            running: AtomicU8::new(IDLE),
            hooks,
        }
    }

    /// Replace the exception handler
    ///
    /// Intended to be called before `run`; a running processor picks the new
    /// handler up on its next failure.
    pub fn set_exception_handler(&self, exception_handler: Arc<dyn ExceptionHandler<T>>) {
        *self.exception_handler.lock() = exception_handler;
    }

    fn exception_handler(&self) -> Arc<dyn ExceptionHandler<T>> {
        self.exception_handler.lock().clone()
    }

    fn process_events(&self, handler: &mut H) {
        let mut next_sequence = self.sequence.get() + 1;

        loop {
            match self.sequence_barrier.wait_for(next_sequence) {
                Ok(available_sequence) => {
                    if available_sequence >= next_sequence {
                        next_sequence =
                            self.process_batch(handler, next_sequence, available_sequence);
                    }
                }
                Err(DisruptorError::Timeout) => self.notify_timeout(handler),
                Err(DisruptorError::Alert) => {
                    if self.running.load(Ordering::Acquire) != RUNNING {
                        break;
                    }
                }
                Err(error) => {
                    self.exception_handler()
                        .handle_event_exception(error, next_sequence, None);
                    self.sequence.set(next_sequence);
                    next_sequence += 1;
                }
            }
        }
    }

    /// Deliver `next_sequence..=available_sequence`; returns the next sequence to wait for
    fn process_batch(
        &self,
        handler: &mut H,
        mut next_sequence: i64,
        available_sequence: i64,
    ) -> i64 {
        if self.hooks.batch_start {
            handler.on_batch_start(available_sequence - next_sequence + 1);
        }

        while next_sequence <= available_sequence {
            let event = self.data_provider.get(next_sequence);
            if let Err(error) =
                handler.on_event(event, next_sequence, next_sequence == available_sequence)
            {
                self.exception_handler()
                    .handle_event_exception(error, next_sequence, Some(event));
                self.sequence.set(next_sequence);
                return next_sequence + 1;
            }
            next_sequence += 1;
        }

        self.sequence.set(available_sequence);
        next_sequence
    }

    fn notify_timeout(&self, handler: &mut H) {
        if !self.hooks.timeout {
            return;
        }

        let sequence = self.sequence.get();
        if let Err(error) = handler.on_timeout(sequence) {
            self.exception_handler()
                .handle_event_exception(error, sequence, None);
        }
    }

    fn notify_start(&self, handler: &mut H) {
        if !self.hooks.lifecycle {
            return;
        }

        if let Err(error) = handler.on_start() {
            self.exception_handler().handle_on_start_exception(error);
        }
    }

    fn notify_shutdown(&self, handler: &mut H) {
        if !self.hooks.lifecycle {
            return;
        }

        if let Err(error) = handler.on_shutdown() {
            self.exception_handler().handle_on_shutdown_exception(error);
        }
    }

    /// Halted before ever running: fire the lifecycle hooks and go back to idle
    fn early_exit(&self) {
        let mut handler = self.event_handler.lock();
        tracing::debug!(
            sequence = self.sequence.get(),
            "batch event processor halted before start"
        );
        self.notify_start(&mut handler);
        self.notify_shutdown(&mut handler);

        let _ = self
            .running
            .compare_exchange(HALTED, IDLE, Ordering::AcqRel, Ordering::Acquire);
    }
}

impl<T, H> EventProcessor for BatchEventProcessor<T, H>
where
    H: EventHandler<T>,
{
    fn get_sequence(&self) -> Arc<Sequence> {
        Arc::clone(&self.sequence)
    }

    fn halt(&self) {
        self.running.store(HALTED, Ordering::Release);
        self.sequence_barrier.alert();
        tracing::debug!(sequence = self.sequence.get(), "batch event processor halt requested");
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire) != IDLE
    }

    fn run(&self) -> Result<()> {
        match self
            .running
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                let _idle = IdleOnDrop(&self.running);
                self.sequence_barrier.clear_alert();

                let mut handler = self.event_handler.lock();
                self.notify_start(&mut handler);
                tracing::debug!(sequence = self.sequence.get(), "batch event processor started");

                let shutdown = ShutdownOnDrop {
                    processor: self,
                    handler: &mut handler,
                };
                if self.running.load(Ordering::Acquire) == RUNNING {
                    self.process_events(&mut *shutdown.handler);
                }
                drop(shutdown);
                Ok(())
            }
            Err(RUNNING) => Err(DisruptorError::AlreadyRunning),
            Err(_) => {
                self.early_exit();
                Ok(())
            }
        }
    }
}

impl<T, H> std::fmt::Debug for BatchEventProcessor<T, H>
where
    H: EventHandler<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchEventProcessor")
            .field("sequence", &self.sequence.get())
            .field("running", &self.running.load(Ordering::Relaxed))
            .field("hooks", &self.hooks)
            .finish()
    }
}
