//! Property-based tests for remaining-match bookkeeping.
//!
//! - Reduction never grows a remaining set and keeps it strictly ascending
//! - Reduction is idempotent
//! - Keeping both flags selects exactly the remaining set
//! - Seeded-only and unseeded-only subsets are disjoint when no id carries both flags

use cfgsync_match::*;
use proptest::prelude::*;
use std::collections::BTreeSet;

#[derive(Clone, Debug)]
struct Cfg(String);

impl RawItem for Cfg {
    fn raw_id(&self) -> &str {
        &self.0
    }
}

const N: usize = 24;

fn engine() -> MatchProcessing<RawItemList<Cfg>> {
    let mk = || RawItemList::new((0..N).map(|i| Cfg(format!("{i:04}"))).collect());
    MatchProcessing::new(mk(), None, mk(), None)
}

/// One-to-one batch: distinct lefts paired with a permutation of distinct rights.
fn batch_strategy() -> impl Strategy<Value = Vec<CompareResult>> {
    (
        prop::sample::subsequence((0..N).collect::<Vec<_>>(), 0..N),
        any::<bool>(),
    )
        .prop_flat_map(|(lefts, seeded)| {
            let k = lefts.len();
            (
                Just(lefts),
                Just(seeded),
                prop::sample::subsequence((0..N).collect::<Vec<_>>(), k).prop_shuffle(),
            )
        })
        .prop_map(|(lefts, seeded, rights)| {
            lefts
                .into_iter()
                .zip(rights)
                .map(|(l, r)| CompareResult::new(l, r, 1, seeded))
                .collect()
        })
}

fn is_strictly_ascending(v: &[usize]) -> bool {
    v.windows(2).all(|w| w[0] < w[1])
}

proptest! {
    #[test]
    fn reduction_shrinks_and_stays_sorted(batches in prop::collection::vec(batch_strategy(), 1..6)) {
        let mut mp = engine();
        let mut prev_source = mp.source().remaining_match().len();
        let mut prev_target = mp.target().remaining_match().len();

        for mut batch in batches {
            mp.adjust_remaining_match(&mut batch).unwrap();

            let src = mp.source().remaining_match();
            let tgt = mp.target().remaining_match();
            prop_assert!(src.len() <= prev_source);
            prop_assert!(tgt.len() <= prev_target);
            prop_assert!(is_strictly_ascending(src));
            prop_assert!(is_strictly_ascending(tgt));
            for r in &batch {
                prop_assert!(!mp.source().is_remaining(r.left_id));
                prop_assert!(!mp.target().is_remaining(r.right_id));
            }
            prev_source = src.len();
            prev_target = tgt.len();
        }
    }

    #[test]
    fn reduction_is_idempotent(batch in batch_strategy()) {
        let mut once = engine();
        let mut twice = engine();

        once.adjust_remaining_match(&mut batch.clone()).unwrap();
        twice.adjust_remaining_match(&mut batch.clone()).unwrap();
        twice.adjust_remaining_match(&mut batch.clone()).unwrap();

        prop_assert_eq!(once.source().remaining_match(), twice.source().remaining_match());
        prop_assert_eq!(once.target().remaining_match(), twice.target().remaining_match());
    }

    #[test]
    fn keep_both_equals_remaining(batch in batch_strategy(), candidates in batch_strategy()) {
        let mut mp = engine();
        mp.adjust_remaining_match(&mut batch.clone()).unwrap();

        let mut list = CompareResultList::new(candidates);
        mp.prepare_remaining_match(true, true, &mut list).unwrap();

        prop_assert_eq!(mp.source().current_remaining_match(), Some(mp.source().remaining_match()));
        prop_assert_eq!(mp.target().current_remaining_match(), Some(mp.target().remaining_match()));
    }

    #[test]
    fn seeded_and_unseeded_subsets_are_disjoint(
        lefts in prop::sample::subsequence((0..N).collect::<Vec<_>>(), 0..N),
        flags in prop::collection::vec(any::<bool>(), N),
        reduced in batch_strategy(),
    ) {
        let mut mp = engine();
        mp.adjust_remaining_match(&mut reduced.clone()).unwrap();

        // Distinct ids per side, so no id carries both flags.
        let candidates: Vec<CompareResult> = lefts
            .iter()
            .enumerate()
            .map(|(i, &l)| CompareResult::new(l, N - 1 - l, 0, flags[i]))
            .collect();

        let mut list = CompareResultList::new(candidates.clone());
        mp.prepare_remaining_match(true, false, &mut list).unwrap();
        let seeded: BTreeSet<usize> = mp.source().current_remaining_match().unwrap().iter().copied().collect();

        mp.prepare_remaining_match(false, true, &mut list).unwrap();
        let unseeded: BTreeSet<usize> = mp.source().current_remaining_match().unwrap().iter().copied().collect();

        prop_assert!(seeded.is_disjoint(&unseeded));
        for idx in seeded.iter().chain(unseeded.iter()) {
            prop_assert!(mp.source().is_remaining(*idx));
        }
        for r in &candidates {
            if mp.source().is_remaining(r.left_id) {
                prop_assert_eq!(seeded.contains(&r.left_id), r.seeded);
                prop_assert_eq!(unseeded.contains(&r.left_id), !r.seeded);
            }
        }
    }
}
