use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Confirmed source index -> target index.
pub type MatchedMapping = BTreeMap<usize, usize>;

/// What kind of configuration entity a side holds.
///
/// Closed set. `Other` covers config kinds that exist upstream (automations,
/// buckets, ...) but carry no label for match reporting.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigType {
    Entity { entities_type: String },
    Settings { schema_id: String },
    ClassicApi { api: String },
    Other { name: String },
}

impl ConfigType {
    pub fn entity(entities_type: impl Into<String>) -> Self {
        Self::Entity {
            entities_type: entities_type.into(),
        }
    }

    pub fn settings(schema_id: impl Into<String>) -> Self {
        Self::Settings {
            schema_id: schema_id.into(),
        }
    }

    pub fn classic_api(api: impl Into<String>) -> Self {
        Self::ClassicApi { api: api.into() }
    }

    /// Label used to report the reconciliation subject.
    ///
    /// Entity tag, settings schema id or classic API name; empty for anything else.
    pub fn label(&self) -> &str {
        match self {
            ConfigType::Entity { entities_type } => entities_type,
            ConfigType::Settings { schema_id } => schema_id,
            ConfigType::ClassicApi { api } => api,
            ConfigType::Other { .. } => "",
        }
    }
}

/// One candidate pairing produced by a comparator.
///
/// `weight` is the comparator's score and is never interpreted here.
/// `seeded` marks pairs backed by an explicit hint rather than heuristics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompareResult {
    pub left_id: usize,
    pub right_id: usize,
    pub weight: i32,
    pub seeded: bool,
}

impl CompareResult {
    pub fn new(left_id: usize, right_id: usize, weight: i32, seeded: bool) -> Self {
        Self {
            left_id,
            right_id,
            weight,
            seeded,
        }
    }

    pub fn seeded(left_id: usize, right_id: usize) -> Self {
        Self::new(left_id, right_id, 1, true)
    }

    pub fn unseeded(left_id: usize, right_id: usize) -> Self {
        Self::new(left_id, right_id, 1, false)
    }

    pub fn left_id(&self) -> usize {
        self.left_id
    }

    pub fn right_id(&self) -> usize {
        self.right_id
    }
}

/// Candidate list for one round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareResultList {
    pub compare_results: Vec<CompareResult>,
}

impl CompareResultList {
    pub fn new(compare_results: Vec<CompareResult>) -> Self {
        Self { compare_results }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: CompareResult) {
        self.compare_results.push(result);
    }

    pub fn len(&self) -> usize {
        self.compare_results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compare_results.is_empty()
    }

    /// Entries whose left id and right id each occur exactly once in the list.
    ///
    /// Ambiguous candidates (one item pairing with several on the other side)
    /// are left for a later round. Output is ordered by left id.
    pub fn unique_matches(&self) -> Vec<CompareResult> {
        let mut left_count: BTreeMap<usize, usize> = BTreeMap::new();
        let mut right_count: BTreeMap<usize, usize> = BTreeMap::new();
        for r in &self.compare_results {
            *left_count.entry(r.left_id).or_insert(0) += 1;
            *right_count.entry(r.right_id).or_insert(0) += 1;
        }

        let mut out: Vec<CompareResult> = self
            .compare_results
            .iter()
            .filter(|r| left_count[&r.left_id] == 1 && right_count[&r.right_id] == 1)
            .copied()
            .collect();
        crate::sort_by_left(&mut out);
        out
    }
}

impl From<Vec<CompareResult>> for CompareResultList {
    fn from(compare_results: Vec<CompareResult>) -> Self {
        Self { compare_results }
    }
}

/// Typed form of the `(keep_seeded, keep_unseeded)` round flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundScope {
    /// Every index still remaining.
    All,
    /// Only indices named by seeded candidates.
    SeededOnly,
    /// Only indices named by unseeded candidates.
    UnseededOnly,
}

impl RoundScope {
    /// `None` when neither flag is set: such a round selects nothing.
    pub fn from_flags(keep_seeded: bool, keep_unseeded: bool) -> Option<Self> {
        match (keep_seeded, keep_unseeded) {
            (true, true) => Some(RoundScope::All),
            (true, false) => Some(RoundScope::SeededOnly),
            (false, true) => Some(RoundScope::UnseededOnly),
            (false, false) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundScope::All => "ALL",
            RoundScope::SeededOnly => "SEEDED",
            RoundScope::UnseededOnly => "UNSEEDED",
        }
    }

    /// Whether a candidate with the given flag belongs to this scope.
    pub fn keeps(&self, seeded: bool) -> bool {
        match self {
            RoundScope::All => true,
            RoundScope::SeededOnly => seeded,
            RoundScope::UnseededOnly => !seeded,
        }
    }
}
