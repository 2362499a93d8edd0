//! cfgsync-match
//!
//! Remaining-match reduction engine.
//!
//! Architectural decisions:
//! - Raw items are addressed by index only; both sides are sorted exactly once at construction
//! - Remaining sets are sorted, duplicate-free index vectors that only ever shrink
//! - Working subsets are derived per round from seeded / unseeded candidates
//! - Reduction never writes the matched mapping; the driver commits pairs explicitly
//!
//! Deterministic, pure logic. No IO. No comparator calls.

mod engine;
mod env;
mod error;
mod ordering;
mod types;

pub use engine::MatchProcessing;
pub use env::MatchProcessingEnv;
pub use error::{MatchError, Side};
pub use ordering::{
    by_left, by_right, sort_by_left, sort_by_right, RawItem, RawItemList, RawMatchList,
};
pub use types::*;
