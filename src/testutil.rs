use std::collections::BTreeSet;

use itertools::Itertools;
use num::{CheckedAdd, One, PrimInt};
use proptest::{collection::btree_set, prelude::*};
use rand::{SeedableRng, seq::index};

use crate::{RoaringBitmap, traits::BitmapRead};

pub fn mkbitmap(values: impl IntoIterator<Item = u32>) -> RoaringBitmap {
    RoaringBitmap::create(values)
}

/// Verifies every read operation of `set` against the sorted unique values in
/// `expected`.
#[track_caller]
pub fn test_bitmap_read<B>(set: &B, expected: &[B::Value])
where
    B: BitmapRead,
    B::Value: PrimInt,
{
    assert_eq!(set.cardinality(), expected.len() as u64, "cardinality");
    assert_eq!(set.is_empty(), expected.is_empty(), "is_empty");
    assert_eq!(set.last(), expected.last().copied(), "last");
    itertools::assert_equal(set.iter(), expected.iter().copied());

    for (i, &value) in expected.iter().enumerate() {
        assert!(set.contains(value), "contains({value:?})");
        assert_eq!(set.rank(value), i as u64 + 1, "rank({value:?})");
        assert_eq!(set.select(i as u64), Some(value), "select({i})");

        // the successor of a value is absent unless it is the next value
        let next = value
            .checked_add(&B::Value::one())
            .filter(|next| expected.get(i + 1) != Some(next));
        if let Some(next) = next {
            assert!(!set.contains(next), "!contains({next:?})");
            assert_eq!(set.rank(next), i as u64 + 1, "rank({next:?})");
        }
    }
    assert_eq!(set.select(expected.len() as u64), None, "select past end");
}

/// Generates sets covering sparse, clustered, and bucket-filling shapes.
pub fn arb_values() -> impl Strategy<Value = BTreeSet<u32>> {
    prop_oneof![
        btree_set(any::<u32>(), 0..512),
        btree_set(0u32..(1 << 18), 0..12288),
        (0u32..4, 0u32..8192).prop_map(|(bucket, skip)| {
            ((bucket << 16) + skip..((bucket + 1) << 16)).collect()
        }),
    ]
}

pub struct SetGen {
    rng: rand::rngs::StdRng,
}

impl SetGen {
    pub fn new(seed: u64) -> Self {
        let rng = rand::rngs::StdRng::seed_from_u64(seed);
        Self { rng }
    }

    /// `len` sorted unique values drawn from the whole `u32` domain.
    pub fn random(&mut self, len: usize) -> Vec<u32> {
        index::sample(&mut self.rng, u32::MAX as usize, len)
            .into_iter()
            .map(|i| i as u32)
            .sorted()
            .collect()
    }

    /// `len` sorted unique values drawn from a single bucket.
    pub fn random_low(&mut self, len: usize) -> Vec<u16> {
        index::sample(&mut self.rng, 1 << 16, len)
            .into_iter()
            .map(|i| i as u16)
            .sorted()
            .collect()
    }

    /// `per_bucket` values in each of `buckets` randomly chosen buckets.
    #[track_caller]
    pub fn distributed(&mut self, buckets: usize, per_bucket: usize) -> Vec<u32> {
        let mut out = Vec::with_capacity(buckets * per_bucket);
        for high in index::sample(&mut self.rng, 1 << 16, buckets) {
            for low in index::sample(&mut self.rng, 1 << 16, per_bucket) {
                out.push(((high as u32) << 16) | low as u32);
            }
        }
        out.sort();
        assert_eq!(out.len(), buckets * per_bucket);
        out
    }
}
