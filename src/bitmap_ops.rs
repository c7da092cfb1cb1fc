use std::ops::{BitAnd, BitOr, BitXor, Not, Sub};

use crate::RoaringBitmap;

macro_rules! binary_bitop {
    ($BitOp:tt, $bitop:ident, $method:ident) => {
        impl $BitOp<&RoaringBitmap> for &RoaringBitmap {
            type Output = RoaringBitmap;
            #[inline]
            fn $bitop(self, rhs: &RoaringBitmap) -> Self::Output {
                RoaringBitmap::$method(self, rhs)
            }
        }
        impl $BitOp<RoaringBitmap> for &RoaringBitmap {
            type Output = RoaringBitmap;
            #[inline]
            fn $bitop(self, rhs: RoaringBitmap) -> Self::Output {
                RoaringBitmap::$method(self, &rhs)
            }
        }
        impl $BitOp<&RoaringBitmap> for RoaringBitmap {
            type Output = RoaringBitmap;
            #[inline]
            fn $bitop(self, rhs: &RoaringBitmap) -> Self::Output {
                RoaringBitmap::$method(&self, rhs)
            }
        }
        impl $BitOp<RoaringBitmap> for RoaringBitmap {
            type Output = RoaringBitmap;
            #[inline]
            fn $bitop(self, rhs: RoaringBitmap) -> Self::Output {
                RoaringBitmap::$method(&self, &rhs)
            }
        }
    };
}

binary_bitop!(BitOr, bitor, or);
binary_bitop!(BitAnd, bitand, and);
binary_bitop!(BitXor, bitxor, xor);
binary_bitop!(Sub, sub, and_not);

impl Not for &RoaringBitmap {
    type Output = RoaringBitmap;
    #[inline]
    fn not(self) -> Self::Output {
        RoaringBitmap::not(self)
    }
}

impl Not for RoaringBitmap {
    type Output = RoaringBitmap;
    #[inline]
    fn not(self) -> Self::Output {
        RoaringBitmap::not(&self)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeSet,
        ops::{BitAnd, BitOr, BitXor, Sub},
    };

    use itertools::assert_equal;
    use proptest::proptest;

    use crate::{
        RoaringBitmap,
        testutil::{arb_values, mkbitmap},
        traits::BitmapRead,
    };

    macro_rules! test_bitop {
        ($test_name:ident, $op_method:ident, $set_method:ident) => {
            proptest! {
                #[test]
                fn $test_name(
                    optimize: bool,
                    a in arb_values(),
                    b in arb_values(),
                ) {
                    let expected: BTreeSet<u32> = a.$set_method(&b).copied().collect();

                    let mut a = mkbitmap(a);
                    let b = mkbitmap(b);

                    if optimize {
                        a = a.optimize();
                    }
                    let (a_before, b_before) = (a.clone(), b.clone());

                    // test all combinations of refs
                    let out = (&a).$op_method(&b);
                    assert_eq!(out.cardinality(), expected.len() as u64, "&a, &b");
                    assert_equal(out.iter(), expected.iter().copied());
                    assert_eq!((&a).$op_method(b.clone()), out, "&a, b");
                    assert_eq!(a.clone().$op_method(&b), out, "a, &b");
                    assert_eq!(a.clone().$op_method(b.clone()), out, "a, b");

                    // operands are left untouched
                    assert_eq!(a, a_before);
                    assert_eq!(b, b_before);
                }
            }
        };
    }

    test_bitop!(test_bitor, bitor, union);
    test_bitop!(test_bitand, bitand, intersection);
    test_bitop!(test_bitxor, bitxor, symmetric_difference);
    test_bitop!(test_sub, sub, difference);

    proptest! {
        #[test]
        fn test_equality(a in arb_values(), b in arb_values()) {
            let expected = a == b;
            let a = mkbitmap(a).optimize();
            let b = mkbitmap(b);
            assert_eq!(a == b, expected);
        }

        #[test]
        fn test_double_not(a in arb_values()) {
            let a = mkbitmap(a);
            let not = !&a;
            assert_eq!(not.cardinality(), (1 << 32) - a.cardinality());
            assert_eq!(!not, a);
        }

        #[test]
        fn test_de_morgan(a in arb_values(), b in arb_values()) {
            let (a, b) = (mkbitmap(a), mkbitmap(b));
            assert_eq!(!(&a | &b), !&a & !&b);
            assert_eq!(&a - &b, &a & !&b);
        }

        #[test]
        fn test_algebra(a in arb_values(), b in arb_values(), c in arb_values()) {
            let (a, b, c) = (mkbitmap(a), mkbitmap(b), mkbitmap(c));
            assert_eq!(&a | &b, &b | &a);
            assert_eq!(&a & &b, &b & &a);
            assert_eq!(&a ^ &b, (&a | &b) - (&a & &b));
            assert_eq!(&a & (&b | &c), (&a & &b) | (&a & &c));
            assert_eq!(&a ^ &a, RoaringBitmap::EMPTY);
        }
    }

    #[test]
    fn test_scenarios() {
        let listed = mkbitmap([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(mkbitmap(1..=10), listed);

        let and = mkbitmap(1000..1200) & mkbitmap(1100..1500);
        assert_eq!(and, mkbitmap(1100..1200));

        let and_not = mkbitmap(1000..11000) - mkbitmap(4000..14000);
        assert_eq!(and_not, mkbitmap(1000..4000));
        assert_eq!(and_not.cardinality(), 3000);

        let or = mkbitmap(0..4000) | mkbitmap(3000..8000);
        assert_eq!(or, mkbitmap(0..8000));

        let xor = mkbitmap(0..4097) ^ mkbitmap([4096]);
        assert_eq!(xor, mkbitmap(0..4096));
    }

    #[test]
    fn test_full_and_empty() {
        let full = !RoaringBitmap::EMPTY;
        assert_eq!(full.cardinality(), 1 << 32);
        assert_eq!(!&full, RoaringBitmap::EMPTY);

        let values = mkbitmap([1, 1 << 20, u32::MAX]);
        assert_eq!(&full & &values, values);
        assert_eq!(&full | &values, full);
        assert_eq!((&full ^ &values).cardinality(), (1 << 32) - 3);
        assert_eq!(&values - &full, RoaringBitmap::EMPTY);
        assert_eq!(&values | &RoaringBitmap::EMPTY, values);
        assert_eq!(&values & &RoaringBitmap::EMPTY, RoaringBitmap::EMPTY);
    }
}
