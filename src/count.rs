/// Returns the number of set bits in `word`.
#[inline(always)]
pub fn popcount(word: u64) -> usize {
    word.count_ones() as usize
}

/// Returns the number of set bits across all of `words`.
#[inline]
pub fn popcount_words(words: &[u64]) -> usize {
    words.iter().map(|&w| popcount(w)).sum()
}

/// Returns the position of the `n`th (0-based) set bit in `word`.
/// Requires that `n < popcount(word)`.
#[inline]
pub fn select_in_word(mut word: u64, n: usize) -> u32 {
    debug_assert!(n < popcount(word), "select out of bounds");
    for _ in 0..n {
        // clear the lowest set bit
        word &= word - 1;
    }
    word.trailing_zeros()
}

/// Counts the number of values in `iter` which are strictly greater than the
/// value preceding them. Returns the length of a sorted unique iterator.
#[track_caller]
pub fn count_strictly_increasing<I, T>(iter: I) -> usize
where
    I: IntoIterator<Item = T>,
    T: num::PrimInt,
{
    let mut count = 0;
    let mut last = None;
    for curr in iter {
        if last.is_none_or(|last| curr > last) {
            count += 1;
        }
        last = Some(curr);
    }
    count
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_popcount() {
        assert_eq!(popcount(0), 0);
        assert_eq!(popcount(1), 1);
        assert_eq!(popcount(0b1011_0000), 3);
        assert_eq!(popcount(u64::MAX), 64);
        assert_eq!(popcount(1 << 63), 1);
    }

    #[test]
    fn test_popcount_words() {
        assert_eq!(popcount_words(&[]), 0);
        assert_eq!(popcount_words(&[u64::MAX; 1024]), 65536);
        assert_eq!(popcount_words(&[0b11, 0, 1 << 40]), 3);
    }

    #[test]
    fn test_select_in_word() {
        let word = 0b1010_0110u64;
        assert_eq!(select_in_word(word, 0), 1);
        assert_eq!(select_in_word(word, 1), 2);
        assert_eq!(select_in_word(word, 2), 5);
        assert_eq!(select_in_word(word, 3), 7);
        assert_eq!(select_in_word(u64::MAX, 63), 63);
    }

    #[test]
    fn test_count_strictly_increasing() {
        assert_eq!(count_strictly_increasing::<_, u16>([]), 0);
        assert_eq!(count_strictly_increasing([1u16, 2, 3]), 3);
        assert_eq!(count_strictly_increasing([1u32, 1, 2, 2, 3]), 3);
        assert_eq!(count_strictly_increasing([3u32, 2, 1]), 1);
    }

    proptest! {
        #[test]
        fn test_popcount_matches_bits(word: u64) {
            let expected = (0..64).filter(|i| word & (1 << i) != 0).count();
            prop_assert_eq!(popcount(word), expected);
        }

        #[test]
        fn test_select_inverts_rank(word in 1u64..) {
            let ones = popcount(word);
            for n in 0..ones {
                let pos = select_in_word(word, n);
                prop_assert!(word & (1 << pos) != 0);
                let below = if pos == 0 { 0 } else { word & ((1 << pos) - 1) };
                prop_assert_eq!(popcount(below), n);
            }
        }
    }
}
