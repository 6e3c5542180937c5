//! Property-based tests for the sequencing core
//!
//! These tests use proptest to check invariants over arbitrary inputs and
//! arbitrary interleavings of claims, publishes and consumer progress.

use crate::disruptor::{
    get_minimum_sequence, BusySpinWaitStrategy, DisruptorError, FixedSequenceGroup,
    MultiProducerSequencer, Sequence, Sequenced, Sequencer, SingleProducerSequencer,
};
use proptest::prelude::*;
use std::sync::Arc;

mod sequence_properties {
    use super::*;

    proptest! {
        #[test]
        fn get_and_add_returns_previous(initial in -1_000_000i64..1_000_000, deltas in prop::collection::vec(-50i64..50, 1..40)) {
            let seq = Sequence::new(initial);
            let mut expected = initial;

            for delta in deltas {
                prop_assert_eq!(seq.get_and_add(delta), expected);
                expected += delta;
                prop_assert_eq!(seq.get(), expected);
            }
        }

        #[test]
        fn minimum_sequence_matches_iterator_min(values in prop::collection::vec(any::<i64>(), 0..16), default in any::<i64>()) {
            let sequences: Vec<Arc<Sequence>> = values.iter().map(|&v| Arc::new(Sequence::new(v))).collect();
            let expected = values.iter().copied().fold(default, i64::min);
            prop_assert_eq!(get_minimum_sequence(&sequences, default), expected);
        }

        #[test]
        fn fixed_group_tracks_slowest_member(values in prop::collection::vec(-100i64..100, 1..8), bump in 0usize..8, by in 1i64..50) {
            let sequences: Vec<Arc<Sequence>> = values.iter().map(|&v| Arc::new(Sequence::new(v))).collect();
            let group = FixedSequenceGroup::new(sequences.clone());
            prop_assert_eq!(group.get(), *values.iter().min().unwrap());

            let index = bump % sequences.len();
            sequences[index].add_and_get(by);
            let mut updated = values.clone();
            updated[index] += by;
            prop_assert_eq!(group.get(), *updated.iter().min().unwrap());
        }
    }
}

mod capacity_properties {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    enum Op {
        TryClaim(i64),
        Consume(i64),
    }

    fn ops() -> impl Strategy<Value = Vec<Op>> {
        prop::collection::vec(
            prop_oneof![
                (1i64..=8).prop_map(Op::TryClaim),
                (0i64..=8).prop_map(Op::Consume),
            ],
            1..120,
        )
    }

    fn sequencer(multi: bool, size: usize) -> Arc<dyn Sequencer> {
        let wait_strategy = Arc::new(BusySpinWaitStrategy::new());
        if multi {
            Arc::new(MultiProducerSequencer::new(size, wait_strategy).unwrap())
        } else {
            Arc::new(SingleProducerSequencer::new(size, wait_strategy).unwrap())
        }
    }

    proptest! {
        #[test]
        fn claims_never_overtake_the_slowest_consumer(multi in any::<bool>(), size_power in 2u32..5, ops in ops()) {
            let size = 1usize << size_power;
            let sequencer = sequencer(multi, size);
            let consumer = Arc::new(Sequence::default());
            sequencer.add_gating_sequences(&[consumer.clone()]);

            let mut claimed = -1i64;
            for op in ops {
                match op {
                    Op::TryClaim(n) if n as usize > size => {
                        prop_assert_eq!(sequencer.try_next_n(n), Err(DisruptorError::InvalidArgument(n)));
                    }
                    Op::TryClaim(n) => {
                        let fits = claimed + n - consumer.get() <= size as i64;
                        match sequencer.try_next_n(n) {
                            Ok(hi) => {
                                prop_assert!(fits);
                                prop_assert_eq!(hi, claimed + n);
                                sequencer.publish_range(claimed + 1, hi);
                                claimed = hi;
                            }
                            Err(error) => {
                                prop_assert!(!fits);
                                prop_assert_eq!(error, DisruptorError::InsufficientCapacity);
                            }
                        }
                    }
                    Op::Consume(k) => {
                        consumer.set((consumer.get() + k).min(claimed));
                    }
                }

                prop_assert!(claimed - consumer.get() <= size as i64);
                prop_assert_eq!(sequencer.remaining_capacity(), size as i64 - (claimed - consumer.get()));
            }
        }
    }
}

mod contiguity_properties {
    use super::*;

    proptest! {
        #[test]
        fn highest_published_is_longest_published_prefix(order in Just((0i64..24).collect::<Vec<_>>()).prop_shuffle()) {
            let sequencer = MultiProducerSequencer::new(32, Arc::new(BusySpinWaitStrategy::new())).unwrap();
            let hi = sequencer.next_n(24).unwrap();
            let mut published = [false; 24];

            for seq in order {
                sequencer.publish(seq);
                published[seq as usize] = true;

                let prefix = published.iter().take_while(|&&p| p).count() as i64;
                prop_assert_eq!(sequencer.get_highest_published_sequence(0, hi), prefix - 1);

                for lo in 0..=hi {
                    let reported = sequencer.get_highest_published_sequence(lo, hi);
                    prop_assert!((lo..=reported).all(|s| published[s as usize]));
                }
            }
        }
    }
}
