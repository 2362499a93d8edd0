use std::collections::BTreeSet;

use tracing::debug;

use crate::{
    sort_by_left, sort_by_right, CompareResult, CompareResultList, ConfigType, MatchError,
    MatchProcessingEnv, MatchedMapping, RawMatchList, RoundScope, Side,
};

/// Reconciliation state for one (source, target) pair.
///
/// Owns both sides plus the durable matched mapping. Index bookkeeping
/// (`adjust_remaining_match`) and the mapping (`commit_matches`) are updated
/// by separate calls so a driver can vet a batch before committing it.
#[derive(Clone, Debug)]
pub struct MatchProcessing<L> {
    source: MatchProcessingEnv<L>,
    target: MatchProcessingEnv<L>,
    matched_map: MatchedMapping,
}

impl<L: RawMatchList> MatchProcessing<L> {
    /// Sorts both raw lists (once, for the lifetime of the engine) and marks
    /// every index on both sides as remaining.
    pub fn new(
        mut raw_match_list_source: L,
        source_type: Option<ConfigType>,
        mut raw_match_list_target: L,
        target_type: Option<ConfigType>,
    ) -> Self {
        raw_match_list_source.sort();
        raw_match_list_target.sort();

        let source = MatchProcessingEnv::new(Side::Source, raw_match_list_source, source_type);
        let target = MatchProcessingEnv::new(Side::Target, raw_match_list_target, target_type);

        debug!(
            source_len = source.remaining_match().len(),
            target_len = target.remaining_match().len(),
            "match processing initialized"
        );

        Self {
            source,
            target,
            matched_map: MatchedMapping::new(),
        }
    }

    pub fn source(&self) -> &MatchProcessingEnv<L> {
        &self.source
    }

    pub fn target(&self) -> &MatchProcessingEnv<L> {
        &self.target
    }

    pub fn matched_map(&self) -> &MatchedMapping {
        &self.matched_map
    }

    pub fn into_matched_map(self) -> MatchedMapping {
        self.matched_map
    }

    /// Target descriptor when present, else source.
    pub fn config_type(&self) -> Option<&ConfigType> {
        self.target
            .config_type()
            .or_else(|| self.source.config_type())
    }

    /// Reporting label for the resolved config type; empty when unknown.
    pub fn type_label(&self) -> &str {
        self.config_type().map(ConfigType::label).unwrap_or("")
    }

    /// Remove the indices of a confirmed batch from both remaining sets.
    ///
    /// Reorders `unique_match`. Indices already removed are no-ops, so the call
    /// is idempotent. Out-of-range or repeated indices reject the whole batch.
    /// Any prepared working subset on a side that shrank is dropped.
    pub fn adjust_remaining_match(
        &mut self,
        unique_match: &mut [CompareResult],
    ) -> Result<(), MatchError> {
        self.check_one_to_one(unique_match)?;

        sort_by_left(unique_match);
        let removed_source = self
            .source
            .reduce_remaining_match(unique_match, CompareResult::left_id);

        sort_by_right(unique_match);
        let removed_target = self
            .target
            .reduce_remaining_match(unique_match, CompareResult::right_id);

        debug!(
            batch = unique_match.len(),
            removed_source,
            removed_target,
            source_remaining = self.source.remaining_match().len(),
            target_remaining = self.target.remaining_match().len(),
            "remaining match reduced"
        );
        Ok(())
    }

    /// Flag form of [`MatchProcessing::prepare_round`].
    ///
    /// Neither flag set is a caller error and leaves the engine untouched.
    pub fn prepare_remaining_match(
        &mut self,
        keep_seeded: bool,
        keep_unseeded: bool,
        result_list: &mut CompareResultList,
    ) -> Result<(), MatchError> {
        let scope = RoundScope::from_flags(keep_seeded, keep_unseeded)
            .ok_or(MatchError::EmptyRoundScope)?;
        self.prepare_round(scope, &mut result_list.compare_results)
    }

    /// Derive each side's working subset for the next round.
    ///
    /// - `All`: the full remaining set; `results` is not read.
    /// - `SeededOnly` / `UnseededOnly`: ids of the matching candidates that are
    ///   still remaining, ascending and deduplicated. Reorders `results`.
    pub fn prepare_round(
        &mut self,
        scope: RoundScope,
        results: &mut [CompareResult],
    ) -> Result<(), MatchError> {
        if scope == RoundScope::All {
            self.source.use_all_remaining();
            self.target.use_all_remaining();
        } else {
            for r in results.iter() {
                self.source.check_bounds(r.left_id)?;
                self.target.check_bounds(r.right_id)?;
            }

            sort_by_left(results);
            self.source
                .gen_scoped_match(results, CompareResult::left_id, scope);

            sort_by_right(results);
            self.target
                .gen_scoped_match(results, CompareResult::right_id, scope);
        }

        debug!(
            scope = scope.as_str(),
            source_working = self.source.current_remaining_match().map_or(0, |w| w.len()),
            target_working = self.target.current_remaining_match().map_or(0, |w| w.len()),
            "working subset prepared"
        );
        Ok(())
    }

    /// Record a confirmed batch in the matched mapping.
    ///
    /// Every pair must already be reduced out of both remaining sets and must
    /// not collide with an existing entry. The batch is applied all-or-nothing.
    /// Returns the number of pairs added.
    pub fn commit_matches(&mut self, confirmed: &[CompareResult]) -> Result<usize, MatchError> {
        let mut batch = confirmed.to_vec();
        self.check_one_to_one(&mut batch)?;

        let matched_targets: BTreeSet<usize> = self.matched_map.values().copied().collect();
        for r in &batch {
            if self.source.is_remaining(r.left_id) {
                return Err(MatchError::StillRemaining {
                    side: Side::Source,
                    index: r.left_id,
                });
            }
            if self.target.is_remaining(r.right_id) {
                return Err(MatchError::StillRemaining {
                    side: Side::Target,
                    index: r.right_id,
                });
            }
            if self.matched_map.contains_key(&r.left_id) {
                return Err(MatchError::AlreadyMatched {
                    side: Side::Source,
                    index: r.left_id,
                });
            }
            if matched_targets.contains(&r.right_id) {
                return Err(MatchError::AlreadyMatched {
                    side: Side::Target,
                    index: r.right_id,
                });
            }
        }

        for r in &batch {
            self.matched_map.insert(r.left_id, r.right_id);
        }

        debug!(
            added = batch.len(),
            total = self.matched_map.len(),
            "matches committed"
        );
        Ok(batch.len())
    }

    /// Bounds plus one-to-one check for a confirmed batch. Reorders `batch`.
    fn check_one_to_one(&self, batch: &mut [CompareResult]) -> Result<(), MatchError> {
        for r in batch.iter() {
            self.source.check_bounds(r.left_id)?;
            self.target.check_bounds(r.right_id)?;
        }

        sort_by_left(batch);
        if let Some(w) = batch.windows(2).find(|w| w[0].left_id == w[1].left_id) {
            return Err(MatchError::DuplicateIndex {
                side: Side::Source,
                index: w[0].left_id,
            });
        }

        sort_by_right(batch);
        if let Some(w) = batch.windows(2).find(|w| w[0].right_id == w[1].right_id) {
            return Err(MatchError::DuplicateIndex {
                side: Side::Target,
                index: w[0].right_id,
            });
        }
        Ok(())
    }
}
