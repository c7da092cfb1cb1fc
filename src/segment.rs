use std::iter::FusedIterator;

/// The high 16 bits of a value, used as the key of a container.
pub type Key = u16;

/// The low 16 bits of a value, stored inside a container.
pub type Low = u16;

pub trait SplitHighLow: Sized {
    fn high(self) -> Key;
    fn split(self) -> (Key, Low);
    fn unsplit(high: Key, low: Low) -> Self;
}

impl SplitHighLow for u32 {
    #[inline(always)]
    fn high(self) -> Key {
        (self >> Low::BITS) as Key
    }

    #[inline(always)]
    fn split(self) -> (Key, Low) {
        (self.high(), self as Low)
    }

    #[inline(always)]
    fn unsplit(high: Key, low: Low) -> Self {
        ((high as u32) << Low::BITS) | low as u32
    }
}

/// An iterator of `u32` values split into `(Key, Low)` pairs.
#[must_use]
pub struct IterSplit<I> {
    inner: I,
}

impl<I> IterSplit<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

impl<I: Iterator<Item = u32>> Iterator for IterSplit<I> {
    type Item = (Key, Low);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(SplitHighLow::split)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I: FusedIterator<Item = u32>> FusedIterator for IterSplit<I> {}
impl<I: ExactSizeIterator<Item = u32>> ExactSizeIterator for IterSplit<I> {}
