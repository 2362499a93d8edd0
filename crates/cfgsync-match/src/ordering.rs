//! Ordering adapters.
//!
//! Every index-based batch operation in the engine is a single linear merge
//! against a sorted index vector, so candidates must be sorted by the side's
//! id first. All sorts here are stable.

use std::cmp::Ordering;

use crate::CompareResult;

/// One side's raw collection, as the engine sees it.
///
/// The engine never inspects items; it only sorts the collection once and
/// derives the index range `0..len()` from it.
pub trait RawMatchList {
    type Item;

    /// Sort in place. Must be deterministic for equal inputs.
    fn sort(&mut self);

    fn values(&self) -> &[Self::Item];

    fn len(&self) -> usize {
        self.values().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An item carrying an intrinsic identifier.
pub trait RawItem {
    fn raw_id(&self) -> &str;
}

/// Stock raw collection ordered by [`RawItem::raw_id`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawItemList<T> {
    items: Vec<T>,
}

impl<T: RawItem> RawItemList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.items.get(idx)
    }

    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<T: RawItem> RawMatchList for RawItemList<T> {
    type Item = T;

    fn sort(&mut self) {
        self.items.sort_by(|a, b| a.raw_id().cmp(b.raw_id()));
    }

    fn values(&self) -> &[T] {
        &self.items
    }
}

impl<T: RawItem> From<Vec<T>> for RawItemList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

pub fn by_left(a: &CompareResult, b: &CompareResult) -> Ordering {
    a.left_id.cmp(&b.left_id)
}

pub fn by_right(a: &CompareResult, b: &CompareResult) -> Ordering {
    a.right_id.cmp(&b.right_id)
}

pub fn sort_by_left(results: &mut [CompareResult]) {
    results.sort_by(by_left);
}

pub fn sort_by_right(results: &mut [CompareResult]) {
    results.sort_by(by_right);
}
