use std::{
    fmt::Debug,
    iter::Map,
    ops::RangeInclusive,
    sync::{Arc, LazyLock},
};

use bitvec::{bitbox, boxed::BitBox, order::Lsb0, slice::IterOnes};

use crate::{
    container::{BITMAP_WORDS, MAX_CAPACITY, array::ArrayContainer},
    count::{popcount, popcount_words, select_in_word},
    segment::Low,
    traits::BitmapRead,
};

pub type BitmapIter<'a> = Map<IterOnes<'a, u64, Lsb0>, fn(usize) -> Low>;

static ONE: LazyLock<BitmapContainer> = LazyLock::new(|| BitmapContainer {
    bitmap: Arc::new(bitbox![u64, Lsb0; 1; MAX_CAPACITY]),
    cardinality: MAX_CAPACITY,
});

/// A dense container: one bit per possible low value, with a cached
/// cardinality.
#[derive(Clone, Eq)]
pub struct BitmapContainer {
    bitmap: Arc<BitBox<u64, Lsb0>>,
    cardinality: usize,
}

impl Debug for BitmapContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BitmapContainer({})", self.cardinality)
    }
}

impl BitmapContainer {
    /// Builds a bitmap from sorted unique values.
    pub fn from_sorted_unique(values: &[Low]) -> Self {
        let mut bitmap = bitbox![u64, Lsb0; 0; MAX_CAPACITY];
        for &v in values {
            bitmap.set(v as usize, true);
        }
        BitmapContainer {
            bitmap: Arc::new(bitmap),
            cardinality: values.len(),
        }
    }

    /// Builds a bitmap from raw words, recounting the cardinality.
    pub fn from_words(words: Box<[u64]>) -> Self {
        debug_assert_eq!(words.len(), BITMAP_WORDS);
        let cardinality = popcount_words(&words);
        BitmapContainer {
            bitmap: Arc::new(BitBox::from_boxed_slice(words)),
            cardinality,
        }
    }

    /// Builds a bitmap with every value of `ranges` set.
    pub fn from_ranges(ranges: impl IntoIterator<Item = RangeInclusive<Low>>) -> Self {
        let mut bitmap = bitbox![u64, Lsb0; 0; MAX_CAPACITY];
        for range in ranges {
            bitmap[*range.start() as usize..=*range.end() as usize].fill(true);
        }
        let cardinality = bitmap.count_ones();
        BitmapContainer { bitmap: Arc::new(bitmap), cardinality }
    }

    /// The full bitmap with every value in `values` cleared.
    pub fn complement_of(values: &[Low]) -> Self {
        let mut bitmap = bitbox![u64, Lsb0; 1; MAX_CAPACITY];
        for &v in values {
            bitmap.set(v as usize, false);
        }
        BitmapContainer {
            bitmap: Arc::new(bitmap),
            cardinality: MAX_CAPACITY - values.len(),
        }
    }

    /// The shared bitmap holding every possible low value.
    pub fn one() -> Self {
        ONE.clone()
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.cardinality == MAX_CAPACITY
    }

    /// Returns true if this container shares storage with the singleton.
    pub fn is_shared_one(&self) -> bool {
        Arc::ptr_eq(&self.bitmap, &ONE.bitmap)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cardinality
    }

    #[inline]
    pub fn words(&self) -> &[u64] {
        self.bitmap.as_raw_slice()
    }

    pub fn iter_values(&self) -> BitmapIter<'_> {
        let to_low: fn(usize) -> Low = |v| v as Low;
        self.bitmap.iter_ones().map(to_low)
    }

    pub fn to_array(&self) -> ArrayContainer {
        ArrayContainer::from_sorted_unique_unchecked(self.iter_values().collect())
    }

    /// Combines two bitmaps word by word, recounting the cardinality.
    fn zip_words(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Self {
        let mut bitmap = (*self.bitmap).clone();
        let mut cardinality = 0;
        for (a, &b) in bitmap.as_raw_mut_slice().iter_mut().zip(other.words()) {
            *a = op(*a, b);
            cardinality += popcount(*a);
        }
        BitmapContainer { bitmap: Arc::new(bitmap), cardinality }
    }

    pub fn union(&self, other: &Self) -> Self {
        self.zip_words(other, |a, b| a | b)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        self.zip_words(other, |a, b| a & b)
    }

    pub fn difference(&self, other: &Self) -> Self {
        self.zip_words(other, |a, b| a & !b)
    }

    pub fn symmetric_difference(&self, other: &Self) -> Self {
        self.zip_words(other, |a, b| a ^ b)
    }

    pub fn complement(&self) -> Self {
        let mut bitmap = (*self.bitmap).clone();
        for word in bitmap.as_raw_mut_slice() {
            *word = !*word;
        }
        BitmapContainer {
            bitmap: Arc::new(bitmap),
            cardinality: MAX_CAPACITY - self.cardinality,
        }
    }

    /// Sets every bit in `values`.
    pub fn union_array(&self, values: &[Low]) -> Self {
        let mut bitmap = (*self.bitmap).clone();
        let mut cardinality = self.cardinality;
        for &v in values {
            if !bitmap.replace(v as usize, true) {
                cardinality += 1;
            }
        }
        BitmapContainer { bitmap: Arc::new(bitmap), cardinality }
    }

    /// Flips every bit in `values`.
    pub fn symmetric_difference_array(&self, values: &[Low]) -> Self {
        let mut bitmap = (*self.bitmap).clone();
        let mut cardinality = self.cardinality;
        for &v in values {
            let was_set = bitmap[v as usize];
            bitmap.set(v as usize, !was_set);
            if was_set {
                cardinality -= 1;
            } else {
                cardinality += 1;
            }
        }
        BitmapContainer { bitmap: Arc::new(bitmap), cardinality }
    }

    /// Clears every bit in `values`.
    pub fn difference_array(&self, values: &[Low]) -> Self {
        let mut bitmap = (*self.bitmap).clone();
        let mut cardinality = self.cardinality;
        for &v in values {
            if bitmap.replace(v as usize, false) {
                cardinality -= 1;
            }
        }
        BitmapContainer { bitmap: Arc::new(bitmap), cardinality }
    }
}

impl BitmapRead for BitmapContainer {
    type Value = Low;

    #[inline]
    fn cardinality(&self) -> u64 {
        self.cardinality as u64
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.cardinality == 0
    }

    #[inline]
    fn contains(&self, value: Low) -> bool {
        self.bitmap[value as usize]
    }

    fn rank(&self, value: Low) -> u64 {
        let words = self.words();
        let (word, bit) = (value as usize / 64, value as usize % 64);
        // keep bits 0..=bit of the final word
        let mask = u64::MAX >> (63 - bit);
        (popcount_words(&words[..word]) + popcount(words[word] & mask)) as u64
    }

    fn select(&self, idx: u64) -> Option<Low> {
        let mut remaining = usize::try_from(idx).ok()?;
        for (i, &word) in self.words().iter().enumerate() {
            let ones = popcount(word);
            if remaining < ones {
                return Some((i * 64) as Low + select_in_word(word, remaining) as Low);
            }
            remaining -= ones;
        }
        None
    }

    fn last(&self) -> Option<Low> {
        self.bitmap.last_one().map(|v| v as Low)
    }

    fn iter(&self) -> impl Iterator<Item = Low> {
        self.iter_values()
    }
}

impl PartialEq for BitmapContainer {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cardinality == other.cardinality
            && (Arc::ptr_eq(&self.bitmap, &other.bitmap) || self.words() == other.words())
    }
}
