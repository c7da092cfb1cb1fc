//! Merge primitives over strictly increasing slices.
//!
//! Every function in this module requires its inputs to be sorted and free of
//! duplicates, and produces output with the same property.

use std::cmp::Ordering;

use itertools::{EitherOrBoth, Itertools};
use num::PrimInt;

/// When one side of an intersection is this many times longer than the other,
/// the shorter side drives a galloping search through the longer side.
const GALLOP_RATIO: usize = 64;

/// Returns the first index greater than `pos` such that `array[index] >= min`,
/// or `array.len()` if no such index exists.
#[inline]
pub fn advance_until<T: Ord>(array: &[T], pos: usize, min: &T) -> usize {
    let lower = pos + 1;
    if lower >= array.len() || array[lower] >= *min {
        return lower;
    }
    lower + array[lower..].partition_point(|v| v < min)
}

pub fn union_sorted<T: PrimInt>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend(
        a.iter()
            .copied()
            .merge_join_by(b.iter().copied(), T::cmp)
            .map(|x| match x {
                EitherOrBoth::Both(v, _) | EitherOrBoth::Left(v) | EitherOrBoth::Right(v) => v,
            }),
    );
    out
}

pub fn difference_sorted<T: PrimInt>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(a.len());
    out.extend(
        a.iter()
            .copied()
            .merge_join_by(b.iter().copied(), T::cmp)
            .filter_map(|x| match x {
                EitherOrBoth::Left(v) => Some(v),
                EitherOrBoth::Both(_, _) | EitherOrBoth::Right(_) => None,
            }),
    );
    out
}

pub fn xor_sorted<T: PrimInt>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend(
        a.iter()
            .copied()
            .merge_join_by(b.iter().copied(), T::cmp)
            .filter_map(|x| match x {
                EitherOrBoth::Both(_, _) => None,
                EitherOrBoth::Left(v) | EitherOrBoth::Right(v) => Some(v),
            }),
    );
    out
}

/// Intersects two sorted slices, galloping through the longer slice when the
/// lengths are lopsided.
pub fn intersect_sorted<T: PrimInt>(a: &[T], b: &[T]) -> Vec<T> {
    if a.len() * GALLOP_RATIO < b.len() {
        intersect_galloping(a, b)
    } else if b.len() * GALLOP_RATIO < a.len() {
        intersect_galloping(b, a)
    } else {
        intersect_local(a, b)
    }
}

fn intersect_local<T: PrimInt>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

fn intersect_galloping<T: PrimInt>(small: &[T], large: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(small.len());
    if large.is_empty() {
        return out;
    }

    // large[k] is always the first candidate >= the previous probe
    let mut k = 0;
    for &v in small {
        if large[k] < v {
            k = advance_until(large, k, &v);
            if k == large.len() {
                break;
            }
        }
        if large[k] == v {
            out.push(v);
        }
    }
    out
}
