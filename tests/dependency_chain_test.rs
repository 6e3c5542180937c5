//! Dependency Chain Tests
//!
//! Processors gated on other processors: a diamond where two parallel
//! stages feed a third, and an upstream handler that reports progress
//! early so its downstream can start before the batch ends.

mod common;

use common::{
    init_tracing, processor, publish_value, ring_buffer, spawn_processor, wait_for_sequence,
    wait_until, ValueEvent,
};
use ringlane::disruptor::{
    BlockingWaitStrategy, ClosureEventHandler, EventHandler, EventProcessor, HandlerHooks,
    ProcessingSequenceBarrier, Result, Sequence, SequenceBarrier, Sequenced, Sequencer,
    SingleProducerSequencer, YieldingWaitStrategy,
};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

#[test]
fn test_diamond_downstream_never_overtakes_either_upstream() {
    init_tracing();

    const EVENTS: i64 = 500;
    let ring_buffer = ring_buffer(8);
    let sequencer = Arc::new(
        SingleProducerSequencer::new(8, Arc::new(YieldingWaitStrategy::new())).unwrap(),
    );

    let stage_barrier = Arc::new(ProcessingSequenceBarrier::new(sequencer.clone(), vec![]));
    let stage_a = processor(
        &ring_buffer,
        stage_barrier.clone(),
        ClosureEventHandler::new(|event: &ValueEvent, _sequence, _| {
            event
                .stage
                .store(event.value.load(Ordering::Acquire) + 1, Ordering::Release);
            Ok(())
        }),
    );
    let stage_b = processor(
        &ring_buffer,
        stage_barrier,
        ClosureEventHandler::new(|_event: &ValueEvent, _sequence, _| Ok(())),
    );

    let join_barrier = Arc::new(ProcessingSequenceBarrier::new(
        sequencer.clone(),
        vec![stage_a.get_sequence(), stage_b.get_sequence()],
    ));
    let violations = Arc::new(AtomicI64::new(0));
    let last_seen = Arc::new(AtomicI64::new(-1));
    let stage_c = processor(&ring_buffer, join_barrier, {
        let a = stage_a.get_sequence();
        let b = stage_b.get_sequence();
        let violations = violations.clone();
        let last_seen = last_seen.clone();
        ClosureEventHandler::new(move |event: &ValueEvent, sequence, _| {
            let overtook = a.get() < sequence || b.get() < sequence;
            let stage_missing =
                event.stage.load(Ordering::Acquire) != event.value.load(Ordering::Acquire) + 1;
            let out_of_order = last_seen.swap(sequence, Ordering::AcqRel) != sequence - 1;
            if overtook || stage_missing || out_of_order {
                violations.fetch_add(1, Ordering::AcqRel);
            }
            Ok(())
        })
    });

    // Only the end of the chain gates the producer
    sequencer.add_gating_sequences(&[stage_c.get_sequence()]);

    let workers = vec![
        spawn_processor(&stage_a),
        spawn_processor(&stage_b),
        spawn_processor(&stage_c),
    ];

    for i in 0..EVENTS {
        publish_value(&*sequencer, &ring_buffer, i * 10);
    }

    wait_for_sequence(&stage_c.get_sequence(), EVENTS - 1);
    stage_a.halt();
    stage_b.halt();
    stage_c.halt();
    for worker in workers {
        worker.join().unwrap().unwrap();
    }

    assert_eq!(violations.load(Ordering::Acquire), 0);
    assert_eq!(last_seen.load(Ordering::Acquire), EVENTS - 1);
    assert!(stage_a.get_sequence().get() >= EVENTS - 1);
    assert!(stage_b.get_sequence().get() >= EVENTS - 1);
}

/// Reports its own progress per event and, at `pause_at`, waits for the
/// downstream stage to catch up before going on
struct EarlyReleaseHandler {
    pause_at: i64,
    downstream: Arc<OnceLock<Arc<Sequence>>>,
    callback: Option<Arc<Sequence>>,
    downstream_caught_up: Arc<AtomicBool>,
}

impl EventHandler<ValueEvent> for EarlyReleaseHandler {
    fn on_event(&mut self, _event: &ValueEvent, sequence: i64, _end_of_batch: bool) -> Result<()> {
        if sequence == self.pause_at {
            let caught_up = wait_until(Duration::from_secs(10), || {
                self.downstream
                    .get()
                    .is_some_and(|downstream| downstream.get() >= self.pause_at - 1)
            });
            self.downstream_caught_up.store(caught_up, Ordering::Release);
        }

        if let Some(callback) = &self.callback {
            callback.set(sequence);
        }
        Ok(())
    }

    fn hooks(&self) -> HandlerHooks {
        HandlerHooks::NONE.with_sequence_reporting()
    }

    fn set_sequence_callback(&mut self, sequence_callback: Arc<Sequence>) {
        self.callback = Some(sequence_callback);
    }
}

#[test]
fn test_reported_progress_releases_downstream_mid_batch() {
    init_tracing();

    let ring_buffer = ring_buffer(16);
    let sequencer = Arc::new(
        SingleProducerSequencer::new(16, Arc::new(BlockingWaitStrategy::new())).unwrap(),
    );

    let downstream_sequence = Arc::new(OnceLock::new());
    let downstream_caught_up = Arc::new(AtomicBool::new(false));
    let upstream = processor(
        &ring_buffer,
        Arc::new(ProcessingSequenceBarrier::new(sequencer.clone(), vec![])),
        EarlyReleaseHandler {
            pause_at: 5,
            downstream: downstream_sequence.clone(),
            callback: None,
            downstream_caught_up: downstream_caught_up.clone(),
        },
    );

    let downstream = processor(
        &ring_buffer,
        Arc::new(ProcessingSequenceBarrier::new(
            sequencer.clone(),
            vec![upstream.get_sequence()],
        )),
        ClosureEventHandler::new(|_event: &ValueEvent, _sequence, _| Ok(())),
    );
    let _ = downstream_sequence.set(downstream.get_sequence());
    sequencer.add_gating_sequences(&[downstream.get_sequence()]);

    // All ten are published before the upstream starts, so it sees one batch
    for i in 0..10 {
        publish_value(&*sequencer, &ring_buffer, i);
    }

    let downstream_worker = spawn_processor(&downstream);
    let upstream_worker = spawn_processor(&upstream);

    wait_for_sequence(&downstream.get_sequence(), 9);
    upstream.halt();
    downstream.halt();
    upstream_worker.join().unwrap().unwrap();
    downstream_worker.join().unwrap().unwrap();

    assert!(downstream_caught_up.load(Ordering::Acquire));
    assert_eq!(upstream.get_sequence().get(), 9);
}

#[test]
fn test_barrier_cursor_reports_slowest_dependency() {
    let sequencer = Arc::new(
        SingleProducerSequencer::new(16, Arc::new(YieldingWaitStrategy::new())).unwrap(),
    );
    let fast = Arc::new(Sequence::new(9));
    let slow = Arc::new(Sequence::new(3));
    let barrier = Arc::new(ProcessingSequenceBarrier::new(
        sequencer.clone(),
        vec![fast, slow.clone()],
    ));

    let hi = sequencer.next_n(10).unwrap();
    sequencer.publish_range(0, hi);

    assert_eq!(barrier.get_cursor(), 3);
    assert_eq!(barrier.wait_for(2).unwrap(), 3);

    let waiter = {
        let barrier = barrier.clone();
        thread::spawn(move || barrier.wait_for(6))
    };
    thread::sleep(Duration::from_millis(20));
    slow.set(7);
    assert_eq!(waiter.join().unwrap().unwrap(), 7);
}
