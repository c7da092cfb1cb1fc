use std::io;

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;
use zerocopy::{ConvertError, SizeError};

use crate::codec::encoder::Encoder;

pub(crate) mod decoder;
pub mod encoder;
pub mod header;

pub trait Encodable {
    fn encoded_size(&self) -> usize;

    fn encode<B: BufMut>(&self, encoder: &mut Encoder<B>);

    fn encode_to_bytes(&self) -> Bytes {
        let size = self.encoded_size();
        let mut encoder = Encoder::new(BytesMut::with_capacity(size));
        self.encode(&mut encoder);
        debug_assert_eq!(encoder.bytes_written(), size, "encoded_size mismatch");
        encoder.into_inner().freeze()
    }
}

#[derive(Debug, Error)]
pub enum DecodeErr {
    #[error("not enough bytes")]
    Length,

    #[error("invalid encoding")]
    Validity,

    #[error("unknown cookie value {0:#010x}")]
    InvalidCookie(u32),

    #[error("{0} unread bytes after the encoded bitmap")]
    TrailingBytes(usize),

    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for DecodeErr {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => DecodeErr::Length,
            _ => DecodeErr::Io(err),
        }
    }
}

impl<S, D> From<SizeError<S, D>> for DecodeErr {
    fn from(_: SizeError<S, D>) -> Self {
        DecodeErr::Length
    }
}

impl<A, S, V> From<ConvertError<A, S, V>> for DecodeErr {
    fn from(err: ConvertError<A, S, V>) -> Self {
        match err {
            ConvertError::Alignment(_) => panic!("All zerocopy transmutations must be unaligned"),
            ConvertError::Size(_) => DecodeErr::Length,
            ConvertError::Validity(_) => DecodeErr::Validity,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use itertools::assert_equal;
    use proptest::proptest;
    use roaring::RoaringBitmap as Reference;

    use crate::{
        Encodable, RoaringBitmap,
        codec::DecodeErr,
        testutil::{SetGen, arb_values, mkbitmap},
        traits::BitmapRead,
    };

    fn reference_bytes(values: impl IntoIterator<Item = u32>) -> Vec<u8> {
        let reference: Reference = values.into_iter().collect();
        let mut buf = vec![];
        reference.serialize_into(&mut buf).unwrap();
        buf
    }

    #[track_caller]
    fn check_round_trip(bitmap: &RoaringBitmap) {
        let buf = bitmap.encode_to_bytes();
        assert_eq!(bitmap.encoded_size(), buf.len(), "encoded_size doesn't match actual size");

        let decoded = RoaringBitmap::from_bytes(&buf).unwrap();
        assert_eq!(&decoded, bitmap);

        // the reference implementation reads our encoding
        let reference = Reference::deserialize_from(&buf[..]).unwrap();
        assert_eq!(reference.len(), bitmap.cardinality());
        assert_equal(reference.iter(), bitmap.iter());
    }

    #[test]
    fn test_round_trip() {
        let mut setgen = SetGen::new(0xDEADBEEF);
        let sets: [Vec<u32>; 9] = [
            vec![],
            vec![0],
            vec![u32::MAX],
            (0..4096).collect(),
            (0..65536).collect(),
            (0..4097).chain(1 << 20..(1 << 20) + 4096).collect(),
            setgen.random(4096),
            setgen.distributed(8, 5000),
            setgen.distributed(3, 10),
        ];
        for set in sets {
            let bitmap = mkbitmap(set);
            check_round_trip(&bitmap);
            check_round_trip(&bitmap.optimize());
        }
    }

    #[test]
    fn test_reference_interop() {
        let values = (0..100)
            .map(|k| k * 1000)
            .chain((100_000..200_000).map(|k| k * 3))
            .chain(700_000..800_000);
        let bitmap = mkbitmap(values.clone());
        check_round_trip(&bitmap);

        // bucket 11 is full and takes the run layout
        assert_eq!(bitmap.encode_to_bytes()[..2], [0x3B, 0x30]);

        let decoded = RoaringBitmap::deserialize_from(&reference_bytes(values)[..]).unwrap();
        assert_eq!(decoded, bitmap);
    }

    #[test]
    fn test_reference_run_containers() {
        let values = (0..100)
            .map(|k| k * 1000)
            .chain((100_000..200_000).map(|k| k * 3))
            .chain(700_000..800_000);
        let mut reference: Reference = values.clone().collect();
        let _ = reference.optimize();
        let mut buf = vec![];
        reference.serialize_into(&mut buf).unwrap();

        // the contiguous buckets are written as run containers
        assert_eq!(buf[..2], [0x3B, 0x30]);

        let decoded = RoaringBitmap::from_bytes(&buf).unwrap();
        assert_eq!(u16::from_le_bytes([buf[2], buf[3]]) as usize + 1, decoded.bucket_count());
        assert_eq!(decoded, mkbitmap(values));
        assert_eq!(decoded.cardinality(), reference.len());
    }

    #[test]
    fn test_full_set_round_trip() {
        let full = RoaringBitmap::full();
        check_round_trip(&full);

        let decoded = RoaringBitmap::from_bytes(full.encode_to_bytes()).unwrap();
        assert_eq!(decoded.cardinality(), 1 << 32);
        assert!(decoded.index().rows().all(|(_, c)| c.is_shared_one()));
    }

    #[test]
    fn test_matches_reference_bytes() {
        let mut setgen = SetGen::new(0xDEADBEEF);
        let sets: [Vec<u32>; 6] = [
            vec![],
            vec![1, 2, 3],
            (0..100).map(|k| k * 1000).collect(),
            (0..4097).collect(),
            setgen.random(2048),
            setgen.distributed(5, 6000),
        ];
        for set in sets {
            let bitmap = mkbitmap(set.iter().copied());
            assert_eq!(
                bitmap.encode_to_bytes().as_ref(),
                reference_bytes(set.iter().copied()).as_slice()
            );

            let mut written = vec![];
            bitmap.serialize_into(&mut written).unwrap();
            assert_eq!(written, reference_bytes(set));
        }
    }

    #[test]
    fn test_singleton_run_bytes() {
        let array_one = mkbitmap(0..4096).encode_to_bytes();
        assert_eq!(
            array_one.as_ref(),
            &[
                0x3B, 0x30, 0x00, 0x00, // cookie, one container
                0x01, // run flags
                0x00, 0x00, 0xFF, 0x0F, // key 0, cardinality 4096
                0x01, 0x00, // one run
                0x00, 0x00, 0xFF, 0x0F, // 0..=4095
            ]
        );

        let bitmap_one = mkbitmap(1 << 16..2 << 16).encode_to_bytes();
        assert_eq!(
            bitmap_one.as_ref(),
            &[
                0x3B, 0x30, 0x00, 0x00, // cookie, one container
                0x01, // run flags
                0x01, 0x00, 0xFF, 0xFF, // key 1, cardinality 65536
                0x01, 0x00, // one run
                0x00, 0x00, 0xFF, 0xFF, // 0..=65535
            ]
        );

        let decoded = RoaringBitmap::from_bytes(&bitmap_one).unwrap();
        assert!(decoded.index().rows().all(|(_, c)| c.is_shared_one()));
    }

    #[test]
    fn test_general_run_containers() {
        #[rustfmt::skip]
        let buf = [
            0x3B, 0x30, 0x01, 0x00, // cookie, two containers
            0b01, // run flags: only the first container
            0x00, 0x00, 0x91, 0x13, // key 0, cardinality 5010
            0x02, 0x00, 0x02, 0x00, // key 2, cardinality 3
            0x02, 0x00, // two runs
            0x0A, 0x00, 0x09, 0x00, // 10..=19
            0x64, 0x00, 0x87, 0x13, // 100..=5099
            0x01, 0x00, 0x02, 0x00, 0x03, 0x00, // 1, 2, 3
        ];
        let decoded = RoaringBitmap::from_bytes(buf).unwrap();
        let expected = (10..20).chain(100..5100).chain([(2 << 16) | 1, (2 << 16) | 2, (2 << 16) | 3]);
        assert_eq!(decoded, mkbitmap(expected));
        assert_eq!(decoded.cardinality(), 5013);
    }

    #[test]
    fn test_corrupted_runs() {
        let run_container = |runs: &[u8]| {
            let mut buf = vec![0x3B, 0x30, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00];
            buf.extend_from_slice(runs);
            RoaringBitmap::from_bytes(buf)
        };
        // no runs
        assert_matches!(run_container(&[0x00, 0x00]), Err(DecodeErr::Validity));
        // 10..=65545 overflows the container
        assert_matches!(
            run_container(&[0x01, 0x00, 0x0A, 0x00, 0xFF, 0xFF]),
            Err(DecodeErr::Validity)
        );
        // overlapping runs
        assert_matches!(
            run_container(&[0x02, 0x00, 0x0A, 0x00, 0x05, 0x00, 0x0C, 0x00, 0x01, 0x00]),
            Err(DecodeErr::Validity)
        );
        // truncated runs
        assert_matches!(run_container(&[0x02, 0x00, 0x0A, 0x00]), Err(DecodeErr::Length));
    }

    #[test]
    fn test_length_corruption() {
        for bitmap in [mkbitmap([1, 2, 3, 70000, 1 << 20]), mkbitmap(0..4096)] {
            let buf = bitmap.encode_to_bytes();
            for len in 0..buf.len() {
                assert_matches!(
                    RoaringBitmap::from_bytes(&buf[..len]),
                    Err(DecodeErr::Length),
                    "Failed for truncated buffer of size {}",
                    len
                );
            }
        }
    }

    #[test]
    fn test_invalid_cookie() {
        assert_matches!(
            RoaringBitmap::from_bytes([0, 0, 0, 0]),
            Err(DecodeErr::InvalidCookie(0))
        );
        let mut buf = reference_bytes([1, 2, 3]);
        buf[1] = 0x31;
        assert_matches!(RoaringBitmap::from_bytes(buf), Err(DecodeErr::InvalidCookie(_)));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut buf = reference_bytes([1, 2, 3]);
        buf.extend_from_slice(&[0, 0]);
        assert_matches!(RoaringBitmap::from_bytes(&buf), Err(DecodeErr::TrailingBytes(2)));

        // a stream stops reading at the end of the bitmap
        let mut reader = &buf[..];
        let decoded = RoaringBitmap::deserialize_from(&mut reader).unwrap();
        assert_eq!(decoded, mkbitmap([1, 2, 3]));
        assert_eq!(reader, &[0, 0]);
    }

    #[test]
    fn test_corrupted_order() {
        #[rustfmt::skip]
        let keys = [
            0x3A, 0x30, 0x00, 0x00, // cookie
            0x02, 0x00, 0x00, 0x00, // two containers
            0x05, 0x00, 0x00, 0x00, // key 5, cardinality 1
            0x03, 0x00, 0x00, 0x00, // key 3, cardinality 1
            0x18, 0x00, 0x00, 0x00, 0x1A, 0x00, 0x00, 0x00, // offsets
            0x01, 0x00, 0x01, 0x00,
        ];
        assert_matches!(RoaringBitmap::from_bytes(keys), Err(DecodeErr::Validity));

        #[rustfmt::skip]
        let values = [
            0x3A, 0x30, 0x00, 0x00, // cookie
            0x01, 0x00, 0x00, 0x00, // one container
            0x00, 0x00, 0x01, 0x00, // key 0, cardinality 2
            0x10, 0x00, 0x00, 0x00, // offsets
            0x05, 0x00, 0x03, 0x00, // 5, 3
        ];
        assert_matches!(RoaringBitmap::from_bytes(values), Err(DecodeErr::Validity));
    }

    #[test]
    fn test_corrupted_bitmap_cardinality() {
        let mut buf = reference_bytes(0..5000);
        // cardinality of the first descriptor
        buf[10..12].copy_from_slice(&5000u16.to_le_bytes());
        assert_matches!(RoaringBitmap::from_bytes(buf), Err(DecodeErr::Validity));
    }

    #[test]
    fn test_too_many_containers() {
        let buf = [0x3A, 0x30, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00];
        assert_matches!(RoaringBitmap::from_bytes(buf), Err(DecodeErr::Validity));
    }

    proptest! {
        #[test]
        fn test_round_trip_proptest(optimize: bool, values in arb_values()) {
            let mut bitmap = mkbitmap(values.iter().copied());
            if optimize {
                bitmap = bitmap.optimize();
            }
            check_round_trip(&bitmap);

            let decoded = RoaringBitmap::from_bytes(reference_bytes(values)).unwrap();
            assert_eq!(decoded, bitmap);
        }
    }
}
