use std::{
    cmp::Ordering,
    fmt::Debug,
    iter::{Copied, FusedIterator, Zip},
    slice,
};

use bytes::BufMut;
use itertools::{EitherOrBoth, Itertools};

use crate::{
    codec::{
        Encodable,
        encoder::Encoder,
        header::{EncodedRun, Layout},
    },
    container::{BITMAP_WORDS, Container, ContainerIter, MAX_CAPACITY, bitmap::BitmapContainer},
    merge::advance_until,
    segment::{IterSplit, Key, Low, SplitHighLow},
    traits::BitmapRead,
};

/// The top level of a roaring bitmap: an ordered map from the high 16 bits of
/// each value to the container holding its low 16 bits.
///
/// Keys are strictly increasing and no container is empty.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct HighLowIndex {
    keys: Vec<Key>,
    containers: Vec<Container>,
    cardinality: u64,
}

impl Debug for HighLowIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.rows()).finish()
    }
}

impl HighLowIndex {
    pub const EMPTY: Self = HighLowIndex {
        keys: Vec::new(),
        containers: Vec::new(),
        cardinality: 0,
    };

    /// Builds an index from rows in strictly increasing key order, dropping
    /// empty containers.
    pub fn from_rows(rows: impl IntoIterator<Item = (Key, Container)>) -> Self {
        let rows = rows.into_iter();
        let (lower, _) = rows.size_hint();
        let mut index = HighLowIndex {
            keys: Vec::with_capacity(lower),
            containers: Vec::with_capacity(lower),
            cardinality: 0,
        };
        for (key, container) in rows {
            if container.is_empty() {
                continue;
            }
            debug_assert!(
                index.keys.last().is_none_or(|&last| last < key),
                "keys must be strictly increasing"
            );
            index.cardinality += container.cardinality();
            index.keys.push(key);
            index.containers.push(container);
        }
        index
    }

    /// Builds an index from a sorted iterator of unique values.
    pub fn from_sorted_unique(values: impl Iterator<Item = u32>) -> Self {
        let buckets = IterSplit::new(values).chunk_by(|&(key, _)| key);
        Self::from_rows((&buckets).into_iter().map(|(key, bucket)| {
            let lows = bucket.map(|(_, low)| low).collect();
            (key, Container::from_sorted_unique(lows))
        }))
    }

    /// The number of non-empty buckets.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn rows(&self) -> Zip<Copied<slice::Iter<'_, Key>>, slice::Iter<'_, Container>> {
        self.keys.iter().copied().zip(self.containers.iter())
    }

    pub fn values(&self) -> Iter<'_> {
        Iter {
            rows: self.rows(),
            current: None,
            remaining: self.cardinality,
        }
    }

    fn merge_rows(
        &self,
        other: &Self,
        combine: impl Fn(&Container, &Container) -> Container,
    ) -> Self {
        let rows = self
            .rows()
            .merge_join_by(other.rows(), |a: &(Key, &Container), b: &(Key, &Container)| {
                a.0.cmp(&b.0)
            })
            .map(|row| match row {
                EitherOrBoth::Both((key, a), (_, b)) => (key, combine(a, b)),
                EitherOrBoth::Left((key, c)) | EitherOrBoth::Right((key, c)) => (key, c.clone()),
            });
        Self::from_rows(rows)
    }

    pub fn or(&self, other: &Self) -> Self {
        self.merge_rows(other, |a, b| a | b)
    }

    pub fn xor(&self, other: &Self) -> Self {
        self.merge_rows(other, |a, b| a ^ b)
    }

    pub fn and(&self, other: &Self) -> Self {
        let mut rows = Vec::with_capacity(self.len().min(other.len()));
        let (mut i, mut j) = (0, 0);
        while i < self.len() && j < other.len() {
            let (a, b) = (self.keys[i], other.keys[j]);
            match a.cmp(&b) {
                Ordering::Less => i = advance_until(&self.keys, i, &b),
                Ordering::Greater => j = advance_until(&other.keys, j, &a),
                Ordering::Equal => {
                    rows.push((a, &self.containers[i] & &other.containers[j]));
                    i += 1;
                    j += 1;
                }
            }
        }
        Self::from_rows(rows)
    }

    pub fn and_not(&self, other: &Self) -> Self {
        let mut rows = Vec::with_capacity(self.len());
        let (mut i, mut j) = (0, 0);
        while i < self.len() && j < other.len() {
            let (a, b) = (self.keys[i], other.keys[j]);
            match a.cmp(&b) {
                Ordering::Less => {
                    // copy the run of rows absent from other
                    let next = advance_until(&self.keys, i, &b);
                    rows.extend(self.rows().skip(i).take(next - i).map(|(k, c)| (k, c.clone())));
                    i = next;
                }
                Ordering::Greater => j = advance_until(&other.keys, j, &a),
                Ordering::Equal => {
                    rows.push((a, &self.containers[i] - &other.containers[j]));
                    i += 1;
                    j += 1;
                }
            }
        }
        rows.extend(self.rows().skip(i).map(|(k, c)| (k, c.clone())));
        Self::from_rows(rows)
    }

    /// The complement of this index over the full `u32` domain.
    pub fn not(&self) -> Self {
        let mut present = self.rows().peekable();
        let rows = (0..=Key::MAX).filter_map(|key| match present.next_if(|&(k, _)| k == key) {
            Some((_, c)) if c.len() == MAX_CAPACITY => None,
            Some((_, c)) => Some((key, !c)),
            None => Some((key, Container::Bitmap(BitmapContainer::one()))),
        });
        Self::from_rows(rows)
    }

    /// Replaces every container equal to a singleton with the shared
    /// singleton.
    pub fn optimize(&self) -> Self {
        Self::from_rows(
            self.rows()
                .map(|(key, c)| (key, c.canonical_one().unwrap_or_else(|| c.clone()))),
        )
    }
}

impl HighLowIndex {
    /// Singleton containers are written as runs, which requires the run
    /// layout.
    fn layout(&self) -> Layout {
        let has_runs = self.containers.iter().any(Container::is_one);
        Layout::new(self.len(), has_runs)
    }
}

impl Container {
    fn encoded_size(&self, layout: Layout) -> usize {
        match self {
            c if layout.has_runs && c.is_one() => size_of::<u16>() + size_of::<EncodedRun>(),
            Container::Array(array) => array.len() * size_of::<Low>(),
            Container::Bitmap(_) => BITMAP_WORDS * size_of::<u64>(),
        }
    }

    fn encode<B: BufMut>(&self, layout: Layout, encoder: &mut Encoder<B>) {
        match self {
            c if layout.has_runs && c.is_one() => encoder.put_full_run(c.len()),
            Container::Array(array) => encoder.put_array_container(array.values()),
            Container::Bitmap(bitmap) => encoder.put_bitmap_container(bitmap.words()),
        }
    }
}

impl Encodable for HighLowIndex {
    fn encoded_size(&self) -> usize {
        let layout = self.layout();
        let payloads: usize = self.containers.iter().map(|c| c.encoded_size(layout)).sum();
        layout.header_len() + payloads
    }

    fn encode<B: BufMut>(&self, encoder: &mut Encoder<B>) {
        let layout = self.layout();
        encoder.put_u32(layout.cookie());

        if layout.has_runs {
            let mut flags = vec![0u8; layout.run_flags_len()];
            for (idx, _) in self.containers.iter().enumerate().filter(|(_, c)| c.is_one()) {
                flags[idx / 8] |= 1 << (idx % 8);
            }
            encoder.put_run_flags(&flags);
        } else {
            encoder.put_u32(self.len() as u32);
        }

        for (key, container) in self.rows() {
            encoder.put_descriptor(key, container.len());
        }

        if layout.has_offsets() {
            // offsets are absolute positions of each payload
            let mut offset = layout.header_len();
            for container in &self.containers {
                encoder.put_u32(offset as u32);
                offset += container.encoded_size(layout);
            }
        }

        for container in &self.containers {
            container.encode(layout, encoder);
        }
    }
}

/// An iterator over the values of a bitmap in ascending order.
#[must_use]
pub struct Iter<'a> {
    rows: Zip<Copied<slice::Iter<'a, Key>>, slice::Iter<'a, Container>>,
    current: Option<(Key, ContainerIter<'a>)>,
    remaining: u64,
}

impl Iterator for Iter<'_> {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        loop {
            if let Some((key, values)) = &mut self.current {
                if let Some(low) = values.next() {
                    self.remaining -= 1;
                    return Some(u32::unsplit(*key, low));
                }
            }
            let (key, container) = self.rows.next()?;
            self.current = Some((key, container.iter_values()));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Iter<'_> {}

impl BitmapRead for HighLowIndex {
    type Value = u32;

    #[inline]
    fn cardinality(&self) -> u64 {
        self.cardinality
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn contains(&self, value: u32) -> bool {
        let (high, low) = value.split();
        self.keys
            .binary_search(&high)
            .is_ok_and(|idx| self.containers[idx].contains(low))
    }

    fn rank(&self, value: u32) -> u64 {
        let (high, low) = value.split();
        let (idx, found) = match self.keys.binary_search(&high) {
            Ok(idx) => (idx, true),
            Err(idx) => (idx, false),
        };
        let prefix: u64 = self.containers[..idx].iter().map(|c| c.cardinality()).sum();
        if found {
            prefix + self.containers[idx].rank(low)
        } else {
            prefix
        }
    }

    fn select(&self, idx: u64) -> Option<u32> {
        let mut remaining = idx;
        for (key, container) in self.rows() {
            let len = container.cardinality();
            if remaining < len {
                return container
                    .select(remaining)
                    .map(|low| u32::unsplit(key, low));
            }
            remaining -= len;
        }
        None
    }

    fn last(&self) -> Option<u32> {
        let (key, container) = self.rows().last()?;
        container.last().map(|low| u32::unsplit(key, low))
    }

    fn iter(&self) -> impl Iterator<Item = u32> {
        self.values()
    }
}
