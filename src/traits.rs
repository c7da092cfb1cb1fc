use std::fmt::Debug;

/// Read access to an ordered set of unsigned integers.
pub trait BitmapRead {
    type Value: Copy + Ord + Debug;

    /// the total number of values in this set.
    fn cardinality(&self) -> u64;

    /// returns true if this set is empty
    fn is_empty(&self) -> bool {
        self.cardinality() == 0
    }

    /// returns true if this set contains the given value
    fn contains(&self, value: Self::Value) -> bool;

    /// returns the number of values contained in this set up to and
    /// including the value.
    fn rank(&self, value: Self::Value) -> u64;

    /// returns the value at position `idx`.
    fn select(&self, idx: u64) -> Option<Self::Value>;

    /// returns the last value in the set
    fn last(&self) -> Option<Self::Value>;

    /// returns an iterator over all values in this set in ascending order
    fn iter(&self) -> impl Iterator<Item = Self::Value>;
}
