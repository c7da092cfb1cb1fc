//! An immutable [Roaring Bitmap](https://roaringbitmap.org/) over `u32` values.
//!
//! ## Key Features:
//!
//! - **Persistent Operations**: every set operation returns a new bitmap and leaves its operands untouched. Buckets which an operation does not change are shared between its inputs and its output.
//!
//! - **Adaptive Containers**: each 65536 value bucket is stored as a sorted array of up to 4096 values, or as a 65536 bit bitmap once it grows past that.
//!
//! - **Portable Encoding**: bitmaps read and write the portable Roaring serialization format used by the other Roaring implementations.

mod bitmap;
mod bitmap_ops;
pub mod codec;
mod container;
mod container_ops;
mod count;
mod index;
mod merge;
mod segment;
mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use bitmap::RoaringBitmap;
pub use codec::{
    DecodeErr, Encodable,
    encoder::Encoder,
    header::{NO_OFFSET_THRESHOLD, SERIAL_COOKIE, SERIAL_COOKIE_NO_RUNCONTAINER},
};
pub use container::{MAX_CAPACITY, MAX_SIZE};
pub use index::Iter;
pub use traits::BitmapRead;
