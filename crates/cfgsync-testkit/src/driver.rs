use anyhow::{Context, Result};
use cfgsync_config::MatchConfig;
use cfgsync_match::{
    CompareResult, CompareResultList, MatchProcessing, MatchedMapping, RawMatchList, RoundScope,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Decides which items of two working subsets correspond.
pub trait Comparator<L: RawMatchList> {
    fn compare(
        &self,
        source: &L,
        source_idx: &[usize],
        target: &L,
        target_idx: &[usize],
    ) -> CompareResultList;
}

impl<L, F> Comparator<L> for F
where
    L: RawMatchList,
    F: Fn(&L, &[usize], &L, &[usize]) -> CompareResultList,
{
    fn compare(
        &self,
        source: &L,
        source_idx: &[usize],
        target: &L,
        target_idx: &[usize],
    ) -> CompareResultList {
        self(source, source_idx, target, target_idx)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round: usize,
    pub scope: RoundScope,
    /// Candidates from the discovery pass over the remaining sets; 0 for `All`.
    pub discovered: usize,
    pub source_working: usize,
    pub target_working: usize,
    pub candidates: usize,
    pub confirmed: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverReport {
    pub type_label: String,
    pub rounds: Vec<RoundReport>,
    pub matched: MatchedMapping,
    pub unmatched_source: Vec<usize>,
    pub unmatched_target: Vec<usize>,
}

/// Reference driver: runs the configured round plan against one engine.
///
/// The engine is borrowed so the caller can still read the sorted raw lists.
///
/// Per round:
/// 1. scoped rounds only: compare everything still remaining (discovery)
/// 2. `prepare_round` narrows each side to the round's working subset
/// 3. compare again, restricted to the working subsets
/// 4. keep in-scope unique matches, reduce them out, commit them
///
/// Stops when either side runs out, after `max_rounds`, or (with
/// `stop_when_idle`) when a round past the explicit plan confirms nothing.
pub struct RoundDriver<C> {
    cfg: MatchConfig,
    comparator: C,
}

impl<C> RoundDriver<C> {
    pub fn new(cfg: MatchConfig, comparator: C) -> Result<Self> {
        cfg.validate().context("round driver config")?;
        Ok(Self { cfg, comparator })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    pub fn run<L>(&self, mp: &mut MatchProcessing<L>) -> Result<DriverReport>
    where
        L: RawMatchList,
        C: Comparator<L>,
    {
        let mut rounds: Vec<RoundReport> = Vec::new();

        for n in 0..self.cfg.max_rounds {
            if mp.source().remaining_match().is_empty() || mp.target().remaining_match().is_empty()
            {
                break;
            }
            let scope = self
                .cfg
                .scope_for_round(n)
                .with_context(|| format!("no round scope for round {n}"))?;

            let report = self.run_round(mp, n, scope)?;
            info!(
                round = n,
                scope = scope.as_str(),
                discovered = report.discovered,
                candidates = report.candidates,
                confirmed = report.confirmed,
                source_remaining = mp.source().remaining_match().len(),
                target_remaining = mp.target().remaining_match().len(),
                "match round complete"
            );

            let idle = report.confirmed == 0;
            rounds.push(report);
            if idle && self.cfg.stop_when_idle && n + 1 >= self.cfg.rounds.len() {
                break;
            }
        }

        Ok(DriverReport {
            type_label: mp.type_label().to_string(),
            rounds,
            matched: mp.matched_map().clone(),
            unmatched_source: mp.source().remaining_match().to_vec(),
            unmatched_target: mp.target().remaining_match().to_vec(),
        })
    }

    fn run_round<L>(
        &self,
        mp: &mut MatchProcessing<L>,
        n: usize,
        scope: RoundScope,
    ) -> Result<RoundReport>
    where
        L: RawMatchList,
        C: Comparator<L>,
    {
        // Scoped rounds need the seeded/unseeded split of what is still
        // remaining before the subset can be narrowed.
        let mut discovery = if scope == RoundScope::All {
            CompareResultList::empty()
        } else {
            self.comparator.compare(
                mp.source().raw_match_list(),
                mp.source().remaining_match(),
                mp.target().raw_match_list(),
                mp.target().remaining_match(),
            )
        };
        let discovered = discovery.len();

        mp.prepare_round(scope, &mut discovery.compare_results)
            .with_context(|| format!("round {n}: prepare {}", scope.as_str()))?;

        let (source_working, target_working) = match (
            mp.source().current_remaining_match(),
            mp.target().current_remaining_match(),
        ) {
            (Some(s), Some(t)) => (s, t),
            _ => anyhow::bail!("round {n}: working subset missing after prepare"),
        };

        let candidates = self.comparator.compare(
            mp.source().raw_match_list(),
            source_working,
            mp.target().raw_match_list(),
            target_working,
        );

        let in_scope: Vec<CompareResult> = candidates
            .compare_results
            .iter()
            .filter(|r| {
                scope.keeps(r.seeded)
                    && source_working.binary_search(&r.left_id).is_ok()
                    && target_working.binary_search(&r.right_id).is_ok()
            })
            .copied()
            .collect();
        let (source_working, target_working) = (source_working.len(), target_working.len());

        let mut unique = CompareResultList::new(in_scope).unique_matches();
        if let Err(e) = mp.adjust_remaining_match(&mut unique) {
            warn!(round = n, error = %e, "confirmed batch rejected");
            return Err(e).with_context(|| format!("round {n}: reduce"));
        }
        let confirmed = mp
            .commit_matches(&unique)
            .with_context(|| format!("round {n}: commit"))?;

        Ok(RoundReport {
            round: n,
            scope,
            discovered,
            source_working,
            target_working,
            candidates: candidates.len(),
            confirmed,
        })
    }
}
