use std::{
    fmt::Debug,
    hash::{Hash, Hasher},
    iter::Copied,
    slice,
};

use either::Either;

use crate::{segment::Low, traits::BitmapRead};

pub mod array;
pub mod bitmap;

use self::{
    array::ArrayContainer,
    bitmap::{BitmapContainer, BitmapIter},
};

pub type ContainerIter<'a> = Either<Copied<slice::Iter<'a, Low>>, BitmapIter<'a>>;

/// Containers with at most this many values use the array representation.
pub const MAX_SIZE: usize = 4096;

/// The number of distinct low values a container can hold.
pub const MAX_CAPACITY: usize = 1 << Low::BITS;

pub(crate) const BITMAP_WORDS: usize = MAX_CAPACITY / u64::BITS as usize;

/// The storage for one 65536 value bucket.
///
/// Every container built by this crate is non-empty when stored in a bitmap,
/// and uses the array representation iff its cardinality is at most
/// [`MAX_SIZE`].
#[derive(Clone)]
pub enum Container {
    Array(ArrayContainer),
    Bitmap(BitmapContainer),
}

impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Container::Array(array) => array.fmt(f),
            Container::Bitmap(bitmap) => bitmap.fmt(f),
        }
    }
}

impl Container {
    /// Builds a container from sorted unique values, picking the
    /// representation by cardinality.
    pub fn from_sorted_unique(values: Vec<Low>) -> Self {
        if values.len() > MAX_SIZE {
            Container::Bitmap(BitmapContainer::from_sorted_unique(&values))
        } else {
            Container::Array(ArrayContainer::from_sorted_unique_unchecked(values))
        }
    }

    pub fn empty() -> Self {
        Container::Array(ArrayContainer::from_sorted_unique_unchecked(Vec::new()))
    }

    /// Wraps a bitmap, downgrading it to an array if it is small enough.
    pub fn from_bitmap(bitmap: BitmapContainer) -> Self {
        if bitmap.len() > MAX_SIZE {
            Container::Bitmap(bitmap)
        } else {
            Container::Array(bitmap.to_array())
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Container::Array(array) => array.len(),
            Container::Bitmap(bitmap) => bitmap.len(),
        }
    }

    pub fn iter_values(&self) -> ContainerIter<'_> {
        match self {
            Container::Array(array) => Either::Left(array.values().iter().copied()),
            Container::Bitmap(bitmap) => Either::Right(bitmap.iter_values()),
        }
    }

    /// Returns true if this container holds every value of one of the two
    /// singleton shapes.
    pub fn is_one(&self) -> bool {
        match self {
            Container::Array(array) => array.is_one(),
            Container::Bitmap(bitmap) => bitmap.is_one(),
        }
    }

    /// Returns true if this container shares storage with a singleton.
    pub fn is_shared_one(&self) -> bool {
        match self {
            Container::Array(array) => array.is_shared_one(),
            Container::Bitmap(bitmap) => bitmap.is_shared_one(),
        }
    }

    /// Returns the shared singleton equal to this container, if any.
    pub fn canonical_one(&self) -> Option<Container> {
        match self {
            Container::Array(array) if array.is_one() => {
                Some(Container::Array(ArrayContainer::one()))
            }
            Container::Bitmap(bitmap) if bitmap.is_one() => {
                Some(Container::Bitmap(BitmapContainer::one()))
            }
            _ => None,
        }
    }
}

impl BitmapRead for Container {
    type Value = Low;

    #[inline]
    fn cardinality(&self) -> u64 {
        self.len() as u64
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn contains(&self, value: Low) -> bool {
        match self {
            Container::Array(array) => array.contains(value),
            Container::Bitmap(bitmap) => bitmap.contains(value),
        }
    }

    fn rank(&self, value: Low) -> u64 {
        match self {
            Container::Array(array) => array.rank(value),
            Container::Bitmap(bitmap) => bitmap.rank(value),
        }
    }

    fn select(&self, idx: u64) -> Option<Low> {
        match self {
            Container::Array(array) => array.select(idx),
            Container::Bitmap(bitmap) => bitmap.select(idx),
        }
    }

    fn last(&self) -> Option<Low> {
        match self {
            Container::Array(array) => array.last(),
            Container::Bitmap(bitmap) => bitmap.last(),
        }
    }

    fn iter(&self) -> impl Iterator<Item = Low> {
        self.iter_values()
    }
}

impl Eq for Container {}

impl Hash for Container {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // equal containers always share a representation, so hashing the
        // storage agrees with equality
        state.write_usize(self.len());
        match self {
            Container::Array(array) => array.values().hash(state),
            Container::Bitmap(bitmap) => bitmap.words().hash(state),
        }
    }
}
