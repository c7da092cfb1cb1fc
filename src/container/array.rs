use std::{
    fmt::Debug,
    sync::{Arc, LazyLock},
};

use crate::{
    container::{MAX_SIZE, bitmap::BitmapContainer},
    merge::{difference_sorted, intersect_sorted, union_sorted, xor_sorted},
    segment::Low,
    traits::BitmapRead,
};

static ONE: LazyLock<ArrayContainer> = LazyLock::new(|| ArrayContainer {
    values: (0..MAX_SIZE as Low).collect(),
});

/// A sparse container: at most [`MAX_SIZE`] strictly increasing low values.
#[derive(Clone, Eq)]
pub struct ArrayContainer {
    values: Arc<[Low]>,
}

impl Debug for ArrayContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ArrayContainer({})", self.values.len())
    }
}

impl ArrayContainer {
    /// Construct an `ArrayContainer` from sorted unique values.
    /// The caller must ensure `values` is strictly increasing and holds at most
    /// `MAX_SIZE` values.
    pub fn from_sorted_unique_unchecked(values: Vec<Low>) -> Self {
        debug_assert!(values.len() <= MAX_SIZE, "array container too large");
        debug_assert!(
            values.is_sorted_by(|a, b| a < b),
            "values must be sorted and unique"
        );
        ArrayContainer { values: values.into() }
    }

    /// The shared array holding every value in `0..MAX_SIZE`.
    pub fn one() -> Self {
        ONE.clone()
    }

    /// Returns true if this container holds exactly `0..MAX_SIZE`.
    #[inline]
    pub fn is_one(&self) -> bool {
        // strictly increasing values starting at 0 can only reach MAX_SIZE - 1
        // at index MAX_SIZE - 1 if every slot is filled
        self.values.len() == MAX_SIZE && self.values.last() == Some(&(MAX_SIZE as Low - 1))
    }

    /// Returns true if this container shares storage with the singleton.
    pub fn is_shared_one(&self) -> bool {
        Arc::ptr_eq(&self.values, &ONE.values)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn values(&self) -> &[Low] {
        &self.values
    }

    pub fn union(&self, other: &Self) -> Vec<Low> {
        union_sorted(&self.values, &other.values)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self::from_sorted_unique_unchecked(intersect_sorted(&self.values, &other.values))
    }

    pub fn difference(&self, other: &Self) -> Self {
        Self::from_sorted_unique_unchecked(difference_sorted(&self.values, &other.values))
    }

    pub fn symmetric_difference(&self, other: &Self) -> Vec<Low> {
        xor_sorted(&self.values, &other.values)
    }

    /// Keeps the values which are present in `bitmap`.
    pub fn retain_in(&self, bitmap: &BitmapContainer) -> Self {
        let values = self
            .values
            .iter()
            .copied()
            .filter(|&v| bitmap.contains(v))
            .collect();
        Self::from_sorted_unique_unchecked(values)
    }

    /// Keeps the values which are absent from `bitmap`.
    pub fn retain_not_in(&self, bitmap: &BitmapContainer) -> Self {
        let values = self
            .values
            .iter()
            .copied()
            .filter(|&v| !bitmap.contains(v))
            .collect();
        Self::from_sorted_unique_unchecked(values)
    }
}

impl BitmapRead for ArrayContainer {
    type Value = Low;

    #[inline]
    fn cardinality(&self) -> u64 {
        self.values.len() as u64
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn contains(&self, value: Low) -> bool {
        self.values.binary_search(&value).is_ok()
    }

    fn rank(&self, value: Low) -> u64 {
        match self.values.binary_search(&value) {
            Ok(index) => index as u64 + 1,
            Err(index) => index as u64,
        }
    }

    fn select(&self, idx: u64) -> Option<Low> {
        usize::try_from(idx)
            .ok()
            .and_then(|idx| self.values.get(idx))
            .copied()
    }

    fn last(&self) -> Option<Low> {
        self.values.last().copied()
    }

    fn iter(&self) -> impl Iterator<Item = Low> {
        self.values.iter().copied()
    }
}

impl PartialEq for ArrayContainer {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.values, &other.values) || self.values == other.values
    }
}
