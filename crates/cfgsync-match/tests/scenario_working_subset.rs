//! Scenario: Working-subset preparation
//!
//! # Invariants under test
//!
//! 1. Keeping both seeded and unseeded selects exactly the remaining set.
//! 2. Seeded-only selects ids of seeded candidates that are still remaining.
//! 3. Unseeded-only selects the complementary candidates; the two subsets are
//!    disjoint when no id carries both flags.
//! 4. Keeping neither fails fast and leaves the previous subset in place.
//! 5. A reduction drops the prepared subset on the side that shrank.
//! 6. Out-of-range candidate ids are rejected before any state change.

use cfgsync_match::*;

#[derive(Clone, Debug)]
struct Cfg(String);

impl RawItem for Cfg {
    fn raw_id(&self) -> &str {
        &self.0
    }
}

fn engine(n_source: usize, n_target: usize) -> MatchProcessing<RawItemList<Cfg>> {
    let mk = |n: usize, prefix: &str| {
        RawItemList::new((0..n).map(|i| Cfg(format!("{prefix}-{i:03}"))).collect())
    };
    MatchProcessing::new(mk(n_source, "src"), None, mk(n_target, "tgt"), None)
}

fn candidates() -> CompareResultList {
    CompareResultList::new(vec![
        CompareResult::unseeded(4, 1),
        CompareResult::seeded(2, 3),
        CompareResult::unseeded(0, 0),
        CompareResult::seeded(1, 2),
        CompareResult::seeded(1, 4),
        CompareResult::unseeded(3, 5),
    ])
}

#[test]
fn keep_both_selects_remaining_set() {
    let mut mp = engine(5, 6);
    mp.adjust_remaining_match(&mut [CompareResult::unseeded(2, 5)])
        .unwrap();

    mp.prepare_remaining_match(true, true, &mut CompareResultList::empty())
        .unwrap();

    assert_eq!(mp.source().current_remaining_match(), Some(&[0, 1, 3, 4][..]));
    assert_eq!(
        mp.target().current_remaining_match(),
        Some(mp.target().remaining_match())
    );
}

#[test]
fn seeded_only_selects_seeded_ids_still_remaining() {
    let mut mp = engine(5, 6);
    // Left 2 and right 4 are already matched.
    mp.adjust_remaining_match(&mut [CompareResult::unseeded(2, 4)])
        .unwrap();

    let mut results = candidates();
    mp.prepare_remaining_match(true, false, &mut results).unwrap();

    assert_eq!(mp.source().current_remaining_match(), Some(&[1][..]));
    assert_eq!(mp.target().current_remaining_match(), Some(&[2, 3][..]));
}

#[test]
fn unseeded_only_is_the_complementary_split() {
    let mut mp = engine(5, 6);

    let mut results = candidates();
    mp.prepare_remaining_match(false, true, &mut results).unwrap();
    let unseeded_source = mp.source().current_remaining_match().unwrap().to_vec();
    let unseeded_target = mp.target().current_remaining_match().unwrap().to_vec();
    assert_eq!(unseeded_source, vec![0, 3, 4]);
    assert_eq!(unseeded_target, vec![0, 1, 5]);

    mp.prepare_round(RoundScope::SeededOnly, &mut results.compare_results)
        .unwrap();
    let seeded_source = mp.source().current_remaining_match().unwrap();
    let seeded_target = mp.target().current_remaining_match().unwrap();
    assert_eq!(seeded_source, &[1, 2]);
    assert_eq!(seeded_target, &[2, 3, 4]);

    assert!(seeded_source.iter().all(|i| !unseeded_source.contains(i)));
    assert!(seeded_target.iter().all(|i| !unseeded_target.contains(i)));
}

#[test]
fn keep_neither_fails_fast_and_keeps_previous_subset() {
    let mut mp = engine(3, 3);
    let err = mp
        .prepare_remaining_match(false, false, &mut candidates())
        .unwrap_err();
    assert_eq!(err, MatchError::EmptyRoundScope);
    assert!(mp.source().current_remaining_match().is_none());

    mp.prepare_remaining_match(true, true, &mut CompareResultList::empty())
        .unwrap();
    mp.prepare_remaining_match(false, false, &mut CompareResultList::empty())
        .unwrap_err();
    assert_eq!(mp.source().current_remaining_match(), Some(&[0, 1, 2][..]));
}

#[test]
fn reduction_drops_stale_subset() {
    let mut mp = engine(3, 3);
    mp.prepare_remaining_match(true, true, &mut CompareResultList::empty())
        .unwrap();

    mp.adjust_remaining_match(&mut [CompareResult::seeded(0, 0)])
        .unwrap();

    assert!(mp.source().current_remaining_match().is_none());
    assert!(mp.target().current_remaining_match().is_none());
}

#[test]
fn out_of_range_candidate_is_rejected() {
    let mut mp = engine(2, 2);
    let mut results = CompareResultList::new(vec![
        CompareResult::seeded(0, 0),
        CompareResult::seeded(2, 1),
    ]);

    let err = mp.prepare_remaining_match(true, false, &mut results).unwrap_err();
    assert_eq!(
        err,
        MatchError::IndexOutOfRange {
            side: Side::Source,
            index: 2,
            len: 2
        }
    );
    assert!(mp.source().current_remaining_match().is_none());
    assert!(mp.target().current_remaining_match().is_none());
}
