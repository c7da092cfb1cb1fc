use std::{
    fmt::Debug,
    io::{self, Read, Write},
};

use bytes::BufMut;
use itertools::Itertools;

use crate::{
    codec::{DecodeErr, Encodable, decoder, encoder::Encoder},
    index::{HighLowIndex, Iter},
    traits::BitmapRead,
};

/// An immutable set of `u32` values stored as a Roaring Bitmap.
///
/// Values are bucketed by their high 16 bits. Each bucket holds its low 16
/// bits in either a sorted array (up to [`MAX_SIZE`](crate::MAX_SIZE) values)
/// or a 65536 bit bitmap. Every operation returns a new `RoaringBitmap` and
/// leaves its operands untouched; unchanged buckets are shared between the
/// operands and the result.
///
/// # Examples
///
/// ```
/// # use frozen_roaring::{RoaringBitmap, BitmapRead};
/// let a = RoaringBitmap::create(1000..1200);
/// let b = RoaringBitmap::create(1100..1500);
///
/// let both = &a & &b;
/// assert_eq!(both.cardinality(), 100);
/// assert!(both.contains(1150));
/// assert!(!both.contains(1200));
///
/// // the operands are unchanged
/// assert_eq!(a.cardinality(), 200);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RoaringBitmap {
    index: HighLowIndex,
}

static_assertions::assert_impl_all!(RoaringBitmap: Send, Sync);

impl Debug for RoaringBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoaringBitmap")
            .field("cardinality", &self.cardinality())
            .field("buckets", &self.index)
            .finish()
    }
}

impl RoaringBitmap {
    /// The empty bitmap.
    pub const EMPTY: Self = RoaringBitmap { index: HighLowIndex::EMPTY };

    #[inline]
    pub(crate) fn new(index: HighLowIndex) -> Self {
        RoaringBitmap { index }
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> &HighLowIndex {
        &self.index
    }

    /// Builds a bitmap from values in any order. Duplicates are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_roaring::{RoaringBitmap, BitmapRead};
    /// let bitmap = RoaringBitmap::create([7, 3, 7, 1 << 20]);
    /// assert_eq!(bitmap.iter().collect::<Vec<_>>(), [3, 7, 1 << 20]);
    /// ```
    pub fn create(values: impl IntoIterator<Item = u32>) -> Self {
        let values = values.into_iter().sorted_unstable().dedup();
        Self::new(HighLowIndex::from_sorted_unique(values))
    }

    /// Returns a bitmap containing every `u32`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_roaring::{RoaringBitmap, BitmapRead};
    /// let full = RoaringBitmap::full();
    /// assert_eq!(full.cardinality(), 1 << 32);
    /// assert_eq!(!full, RoaringBitmap::EMPTY);
    /// ```
    pub fn full() -> Self {
        Self::EMPTY.not()
    }

    /// Returns an equal bitmap in which every bucket holding the value range
    /// of a shared singleton container reuses that singleton's storage.
    pub fn optimize(&self) -> Self {
        Self::new(self.index.optimize())
    }

    /// Returns an iterator over the values of this bitmap in ascending order.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        self.index.values()
    }

    /// The number of non-empty 65536 value buckets.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.index.len()
    }

    /// Returns the union of `self` and `other`.
    pub fn or(&self, other: &Self) -> Self {
        Self::new(self.index.or(&other.index))
    }

    /// Returns the intersection of `self` and `other`.
    pub fn and(&self, other: &Self) -> Self {
        Self::new(self.index.and(&other.index))
    }

    /// Returns the values present in exactly one of `self` and `other`.
    pub fn xor(&self, other: &Self) -> Self {
        Self::new(self.index.xor(&other.index))
    }

    /// Returns the values of `self` which are absent from `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_roaring::{RoaringBitmap, BitmapRead};
    /// let a = RoaringBitmap::create(1000..11000);
    /// let b = RoaringBitmap::create(4000..14000);
    /// assert_eq!(a.and_not(&b), RoaringBitmap::create(1000..4000));
    /// ```
    pub fn and_not(&self, other: &Self) -> Self {
        Self::new(self.index.and_not(&other.index))
    }

    /// Returns the complement of `self` over the full `u32` domain.
    #[allow(clippy::should_implement_trait)]
    pub fn not(&self) -> Self {
        Self::new(self.index.not())
    }
}

impl RoaringBitmap {
    /// Writes this bitmap to `writer` in the portable Roaring format.
    pub fn serialize_into<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.encode_to_bytes())
    }

    /// Reads one bitmap in the portable Roaring format from `reader`. Bytes
    /// following the bitmap are left unread.
    pub fn deserialize_from<R: Read>(reader: R) -> Result<Self, DecodeErr> {
        decoder::decode(reader).map(Self::new)
    }

    /// Decodes a bitmap which must span all of `data`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozen_roaring::{Encodable, RoaringBitmap};
    /// let bitmap = RoaringBitmap::create([1, 2, 3, 1 << 20]);
    /// let bytes = bitmap.encode_to_bytes();
    /// assert_eq!(RoaringBitmap::from_bytes(&bytes).unwrap(), bitmap);
    /// ```
    pub fn from_bytes(data: impl AsRef<[u8]>) -> Result<Self, DecodeErr> {
        let mut data = data.as_ref();
        let bitmap = Self::deserialize_from(&mut data)?;
        if !data.is_empty() {
            return Err(DecodeErr::TrailingBytes(data.len()));
        }
        Ok(bitmap)
    }
}

impl Encodable for RoaringBitmap {
    #[inline]
    fn encoded_size(&self) -> usize {
        self.index.encoded_size()
    }

    #[inline]
    fn encode<B: BufMut>(&self, encoder: &mut Encoder<B>) {
        self.index.encode(encoder)
    }
}

impl FromIterator<u32> for RoaringBitmap {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self::create(iter)
    }
}

/// Signed values are stored by their two's complement bit pattern.
impl FromIterator<i32> for RoaringBitmap {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        Self::create(iter.into_iter().map(|v| v as u32))
    }
}

impl BitmapRead for RoaringBitmap {
    type Value = u32;

    #[inline]
    fn cardinality(&self) -> u64 {
        self.index.cardinality()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    fn contains(&self, value: u32) -> bool {
        self.index.contains(value)
    }

    fn rank(&self, value: u32) -> u64 {
        self.index.rank(value)
    }

    fn select(&self, idx: u64) -> Option<u32> {
        self.index.select(idx)
    }

    fn last(&self) -> Option<u32> {
        self.index.last()
    }

    fn iter(&self) -> impl Iterator<Item = u32> {
        self.index.values()
    }
}

impl<'a> IntoIterator for &'a RoaringBitmap {
    type Item = u32;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.index.values()
    }
}
