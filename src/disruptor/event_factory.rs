//! Event Factory Implementation
//!
//! Factories fill every slot of a [`RingBuffer`](crate::disruptor::RingBuffer)
//! once, at construction, so no allocation happens while events flow.

use std::marker::PhantomData;

/// Creates the events that pre-populate a ring buffer
///
/// Called exactly once per slot.
///
/// # Examples
/// ```
/// use ringlane::disruptor::EventFactory;
///
/// struct OrderEvent {
///     quantity: u64,
/// }
///
/// struct OrderEventFactory;
///
/// impl EventFactory<OrderEvent> for OrderEventFactory {
///     fn new_instance(&self) -> OrderEvent {
///         OrderEvent { quantity: 0 }
///     }
/// }
/// ```
pub trait EventFactory<T>: Send + Sync {
    /// Create a new event in its initial state
    fn new_instance(&self) -> T;
}

/// Event factory that uses `T::default()`
pub struct DefaultEventFactory<T> {
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Default> DefaultEventFactory<T> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T: Default> Default for DefaultEventFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default> EventFactory<T> for DefaultEventFactory<T> {
    fn new_instance(&self) -> T {
        T::default()
    }
}

/// Event factory that calls a closure for every slot
///
/// # Type Parameters
/// * `T` - The event type
/// * `F` - The closure type
pub struct ClosureEventFactory<T, F>
where
    F: Fn() -> T + Send + Sync,
{
    factory_fn: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<T, F> ClosureEventFactory<T, F>
where
    F: Fn() -> T + Send + Sync,
{
    /// Create a new closure-based event factory
    ///
    /// # Arguments
    /// * `factory_fn` - The closure that creates new event instances
    pub fn new(factory_fn: F) -> Self {
        Self {
            factory_fn,
            _phantom: PhantomData,
        }
    }
}

impl<T, F> EventFactory<T> for ClosureEventFactory<T, F>
where
    F: Fn() -> T + Send + Sync,
{
    fn new_instance(&self) -> T {
        (self.factory_fn)()
    }
}
