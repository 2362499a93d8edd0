use crate::{CompareResult, ConfigType, MatchError, RawMatchList, RoundScope, Side};

/// Per-side state: the sorted raw list and the index sets over it.
///
/// Invariants:
/// - `remaining_match` is strictly ascending and only ever shrinks.
/// - `current_remaining_match`, when present, is strictly ascending and was a
///   subset of `remaining_match` when computed. It is dropped whenever
///   `remaining_match` shrinks, so a present working subset is never stale.
#[derive(Clone, Debug)]
pub struct MatchProcessingEnv<L> {
    side: Side,
    raw_match_list: L,
    config_type: Option<ConfigType>,
    remaining_match: Vec<usize>,
    current_remaining_match: Option<Vec<usize>>,
}

impl<L: RawMatchList> MatchProcessingEnv<L> {
    /// `raw_match_list` must already be in its final order.
    pub(crate) fn new(side: Side, raw_match_list: L, config_type: Option<ConfigType>) -> Self {
        let remaining_match = (0..raw_match_list.values().len()).collect();
        Self {
            side,
            raw_match_list,
            config_type,
            remaining_match,
            current_remaining_match: None,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn raw_match_list(&self) -> &L {
        &self.raw_match_list
    }

    pub fn config_type(&self) -> Option<&ConfigType> {
        self.config_type.as_ref()
    }

    /// Indices not yet confirmed as matched, ascending.
    pub fn remaining_match(&self) -> &[usize] {
        &self.remaining_match
    }

    /// Indices eligible for the current round; `None` until prepared or after a reduction.
    pub fn current_remaining_match(&self) -> Option<&[usize]> {
        self.current_remaining_match.as_deref()
    }

    pub fn is_remaining(&self, idx: usize) -> bool {
        self.remaining_match.binary_search(&idx).is_ok()
    }

    pub(crate) fn check_bounds(&self, idx: usize) -> Result<(), MatchError> {
        let len = self.raw_match_list.len();
        if idx >= len {
            return Err(MatchError::IndexOutOfRange {
                side: self.side,
                index: idx,
                len,
            });
        }
        Ok(())
    }

    /// Remove every id of `sorted_results` from the remaining set.
    ///
    /// `sorted_results` must be ordered by `get_id`. Ids that are already gone
    /// are skipped. Returns how many indices were removed.
    pub(crate) fn reduce_remaining_match(
        &mut self,
        sorted_results: &[CompareResult],
        get_id: fn(&CompareResult) -> usize,
    ) -> usize {
        let ids: Vec<usize> = sorted_results.iter().map(get_id).collect();
        let removed = remove_sorted(&mut self.remaining_match, &ids);
        if removed > 0 {
            self.current_remaining_match = None;
        }
        removed
    }

    pub(crate) fn use_all_remaining(&mut self) {
        self.current_remaining_match = Some(self.remaining_match.clone());
    }

    /// Working subset = ids of `sorted_results` kept by `scope` that are still remaining.
    pub(crate) fn gen_scoped_match(
        &mut self,
        sorted_results: &[CompareResult],
        get_id: fn(&CompareResult) -> usize,
        scope: RoundScope,
    ) {
        let ids: Vec<usize> = sorted_results
            .iter()
            .filter(|r| scope.keeps(r.seeded))
            .map(get_id)
            .collect();
        self.current_remaining_match = Some(select_sorted(&self.remaining_match, &ids));
    }
}

/// Single-pass set difference. Both inputs ascending; `ids` may repeat.
fn remove_sorted(remaining: &mut Vec<usize>, ids: &[usize]) -> usize {
    let before = remaining.len();
    let mut j = 0;
    remaining.retain(|&idx| {
        while j < ids.len() && ids[j] < idx {
            j += 1;
        }
        !(j < ids.len() && ids[j] == idx)
    });
    before - remaining.len()
}

/// Single-pass intersection, deduplicated. Both inputs ascending; `ids` may repeat.
fn select_sorted(remaining: &[usize], ids: &[usize]) -> Vec<usize> {
    let mut out: Vec<usize> = Vec::new();
    let mut i = 0;
    for &id in ids {
        while i < remaining.len() && remaining[i] < id {
            i += 1;
        }
        if i == remaining.len() {
            break;
        }
        if remaining[i] == id && out.last() != Some(&id) {
            out.push(id);
        }
    }
    out
}
