use bytes::BufMut;
use zerocopy::{IntoBytes, LittleEndian, U16, U32, U64, transmute_ref};

use crate::{
    codec::header::{Descriptor, EncodedRun},
    segment::{Key, Low},
};

pub struct Encoder<B: BufMut> {
    buf: B,
    bytes_written: usize,
}

impl<B: BufMut> Encoder<B> {
    pub fn new(buf: B) -> Self {
        Self { buf, bytes_written: 0 }
    }

    /// Retrieve the wrapped buffer from the `Encoder`
    pub fn into_inner(self) -> B {
        self.buf
    }

    /// The total number of bytes written to the buffer since this Encoder was
    /// initialized.
    pub(crate) fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub(crate) fn put_u32(&mut self, v: u32) {
        self.put_slice(U32::<LittleEndian>::new(v).as_bytes());
    }

    pub(crate) fn put_run_flags(&mut self, flags: &[u8]) {
        self.put_slice(flags);
    }

    pub(crate) fn put_descriptor(&mut self, key: Key, cardinality: usize) {
        self.put_slice(Descriptor::new(key, cardinality).as_bytes());
    }

    /// Encode an array container into the buffer.
    pub(crate) fn put_array_container(&mut self, values: &[Low]) {
        static_assertions::assert_cfg!(target_endian = "little");
        let values: &[U16<LittleEndian>] = transmute_ref!(values);
        self.put_slice(values.as_bytes());
    }

    /// Encode a bitmap container into the buffer.
    pub(crate) fn put_bitmap_container(&mut self, words: &[u64]) {
        static_assertions::assert_cfg!(target_endian = "little");
        let words: &[U64<LittleEndian>] = transmute_ref!(words);
        self.put_slice(words.as_bytes());
    }

    /// Encode a container holding `0..cardinality` as a single run.
    pub(crate) fn put_full_run(&mut self, cardinality: usize) {
        debug_assert!(cardinality > 0);
        self.put_slice(U16::<LittleEndian>::new(1).as_bytes());
        let run = EncodedRun::new(0, (cardinality - 1) as Low);
        self.put_slice(run.as_bytes());
    }

    fn put_slice(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
        self.bytes_written += data.len();
    }
}
