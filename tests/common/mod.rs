//! Shared fixtures for the integration tests

#![allow(dead_code)]

use ringlane::disruptor::{
    BatchEventProcessor, BlockingWaitStrategy, BusySpinWaitStrategy, DataProvider,
    DefaultEventFactory, EventHandler, EventProcessor, ProcessingSequenceBarrier, RingBuffer,
    Sequence, Sequencer, SleepingWaitStrategy, TimeoutBlockingWaitStrategy,
    WaitStrategy, YieldingWaitStrategy,
};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Event with interior mutability so producers can fill it through `&self`
#[derive(Debug, Default)]
pub struct ValueEvent {
    pub value: AtomicI64,
    pub stage: AtomicI64,
}

/// Install a test subscriber once; `RUST_LOG=ringlane=trace` shows the crate's logs
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn ring_buffer(size: usize) -> Arc<RingBuffer<ValueEvent>> {
    Arc::new(RingBuffer::new(size, DefaultEventFactory::new()).unwrap())
}

/// Build a processor over `ring_buffer` gated by `barrier`
pub fn processor<H>(
    ring_buffer: &Arc<RingBuffer<ValueEvent>>,
    barrier: Arc<ProcessingSequenceBarrier>,
    handler: H,
) -> Arc<BatchEventProcessor<ValueEvent, H>>
where
    H: EventHandler<ValueEvent> + 'static,
{
    let data_provider: Arc<dyn DataProvider<ValueEvent>> = ring_buffer.clone();
    Arc::new(BatchEventProcessor::new(data_provider, barrier, handler))
}

pub fn spawn_processor<P>(processor: &Arc<P>) -> thread::JoinHandle<ringlane::Result<()>>
where
    P: EventProcessor + 'static,
{
    let processor = Arc::clone(processor);
    thread::spawn(move || processor.run())
}

/// Claim one slot, store `value` in it and publish it
pub fn publish_value(
    sequencer: &dyn Sequencer,
    ring_buffer: &RingBuffer<ValueEvent>,
    value: i64,
) -> i64 {
    let seq = sequencer.next().unwrap();
    ring_buffer.get(seq).value.store(value, Ordering::Release);
    sequencer.publish(seq);
    seq
}

/// Poll `condition` until it holds or `timeout` elapses
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while !condition() {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
    true
}

pub fn wait_for_sequence(sequence: &Sequence, target: i64) {
    assert!(
        wait_until(Duration::from_secs(10), || sequence.get() >= target),
        "sequence stuck at {} waiting for {target}",
        sequence.get()
    );
}

pub fn all_wait_strategies() -> Vec<(&'static str, Arc<dyn WaitStrategy>)> {
    vec![
        ("blocking", Arc::new(BlockingWaitStrategy::new())),
        (
            "timeout_blocking",
            Arc::new(TimeoutBlockingWaitStrategy::new(Duration::from_secs(30))),
        ),
        ("sleeping", Arc::new(SleepingWaitStrategy::new())),
        ("yielding", Arc::new(YieldingWaitStrategy::new())),
        ("busy_spin", Arc::new(BusySpinWaitStrategy::new())),
    ]
}
