use std::ops::{BitAnd, BitOr, BitXor, Not, Sub};

use crate::{
    container::{Container, bitmap::BitmapContainer},
    traits::BitmapRead,
};

impl PartialEq for Container {
    fn eq(&self, other: &Container) -> bool {
        use Container::*;

        match (self, other) {
            // use fast physical ops if both containers share storage
            (Array(a), Array(b)) => a == b,
            (Bitmap(a), Bitmap(b)) => a == b,

            // otherwise fall back to logical ops
            (a, b) => a.len() == b.len() && itertools::equal(a.iter(), b.iter()),
        }
    }
}

impl BitOr<&Container> for &Container {
    type Output = Container;

    fn bitor(self, rhs: &Container) -> Container {
        use Container::*;

        match (self, rhs) {
            // special case full
            (Bitmap(a), _) if a.is_one() => self.clone(),
            (_, Bitmap(b)) if b.is_one() => rhs.clone(),

            (Array(a), Array(b)) => Container::from_sorted_unique(a.union(b)),
            (Array(a), Bitmap(b)) | (Bitmap(b), Array(a)) => {
                Container::from_bitmap(b.union_array(a.values()))
            }
            (Bitmap(a), Bitmap(b)) => Container::from_bitmap(a.union(b)),
        }
    }
}

impl BitAnd<&Container> for &Container {
    type Output = Container;

    fn bitand(self, rhs: &Container) -> Container {
        use Container::*;

        match (self, rhs) {
            // special case full
            (Bitmap(a), _) if a.is_one() => rhs.clone(),
            (_, Bitmap(b)) if b.is_one() => self.clone(),

            (Array(a), Array(b)) => Array(a.intersection(b)),
            (Array(a), Bitmap(b)) | (Bitmap(b), Array(a)) => Array(a.retain_in(b)),
            (Bitmap(a), Bitmap(b)) => Container::from_bitmap(a.intersection(b)),
        }
    }
}

impl BitXor<&Container> for &Container {
    type Output = Container;

    fn bitxor(self, rhs: &Container) -> Container {
        use Container::*;

        match (self, rhs) {
            // special case full
            (Bitmap(a), _) if a.is_one() => !rhs,
            (_, Bitmap(b)) if b.is_one() => !self,

            (Array(a), Array(b)) => Container::from_sorted_unique(a.symmetric_difference(b)),
            (Array(a), Bitmap(b)) | (Bitmap(b), Array(a)) => {
                Container::from_bitmap(b.symmetric_difference_array(a.values()))
            }
            (Bitmap(a), Bitmap(b)) => Container::from_bitmap(a.symmetric_difference(b)),
        }
    }
}

/// And-not: the values of `self` which are absent from `rhs`.
impl Sub<&Container> for &Container {
    type Output = Container;

    fn sub(self, rhs: &Container) -> Container {
        use Container::*;

        match (self, rhs) {
            // special case full
            (_, Bitmap(b)) if b.is_one() => Container::empty(),
            (Bitmap(a), _) if a.is_one() => !rhs,

            (Array(a), Array(b)) => Array(a.difference(b)),
            (Array(a), Bitmap(b)) => Array(a.retain_not_in(b)),
            (Bitmap(a), Array(b)) => Container::from_bitmap(a.difference_array(b.values())),
            (Bitmap(a), Bitmap(b)) => Container::from_bitmap(a.difference(b)),
        }
    }
}

impl Not for &Container {
    type Output = Container;

    fn not(self) -> Container {
        match self {
            Container::Bitmap(b) if b.is_one() => Container::empty(),
            Container::Array(a) if a.is_empty() => Container::Bitmap(BitmapContainer::one()),
            Container::Array(a) => {
                Container::from_bitmap(BitmapContainer::complement_of(a.values()))
            }
            Container::Bitmap(b) => Container::from_bitmap(b.complement()),
        }
    }
}
