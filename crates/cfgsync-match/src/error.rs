/// Which side of the reconciliation an index belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Side {
    Source,
    Target,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Target => "target",
        }
    }
}

/// Caller contract violations rejected by [`crate::MatchProcessing`].
///
/// Every operation validates its whole input before mutating anything, so an
/// `Err` always leaves the engine exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchError {
    /// Working-subset preparation called with neither seeded nor unseeded kept.
    EmptyRoundScope,

    /// Index outside the range established at construction.
    IndexOutOfRange { side: Side, index: usize, len: usize },

    /// The same index appears twice on one side of a confirmed batch.
    DuplicateIndex { side: Side, index: usize },

    /// Commit attempted for an index that was never removed from the remaining set.
    StillRemaining { side: Side, index: usize },

    /// Commit attempted for an index already present in the matched mapping.
    AlreadyMatched { side: Side, index: usize },
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchError::EmptyRoundScope => write!(
                f,
                "MATCH_EMPTY_ROUND_SCOPE: round must keep seeded, unseeded or both"
            ),
            MatchError::IndexOutOfRange { side, index, len } => write!(
                f,
                "MATCH_INDEX_OUT_OF_RANGE side={} index={index} len={len}",
                side.as_str()
            ),
            MatchError::DuplicateIndex { side, index } => write!(
                f,
                "MATCH_DUPLICATE_INDEX side={} index={index}: batch must be one-to-one",
                side.as_str()
            ),
            MatchError::StillRemaining { side, index } => write!(
                f,
                "MATCH_STILL_REMAINING side={} index={index}: reduce before commit",
                side.as_str()
            ),
            MatchError::AlreadyMatched { side, index } => write!(
                f,
                "MATCH_ALREADY_MATCHED side={} index={index}",
                side.as_str()
            ),
        }
    }
}

impl std::error::Error for MatchError {}
