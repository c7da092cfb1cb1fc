use std::ops::RangeInclusive;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, LittleEndian, U16, Unaligned};

use crate::{
    codec::DecodeErr,
    segment::{Key, Low},
};

/// Cookie of the layout without run containers. Followed by a `u32` container
/// count.
pub const SERIAL_COOKIE_NO_RUNCONTAINER: u32 = 12346;

/// Cookie of the layout with run containers, stored in the low 16 bits of
/// the first word. The high 16 bits store the container count minus one.
pub const SERIAL_COOKIE: u32 = 12347;

/// Run layouts with fewer containers than this omit the offset table.
pub const NO_OFFSET_THRESHOLD: usize = 4;

/// The largest number of containers a bitmap can hold.
const MAX_CONTAINERS: usize = 1 << Key::BITS;

/// The shape of an encoded bitmap, fixed by its first word(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub size: usize,
    pub has_runs: bool,
}

impl Layout {
    pub fn new(size: usize, has_runs: bool) -> Self {
        debug_assert!(size <= MAX_CONTAINERS, "too many containers");
        debug_assert!(size > 0 || !has_runs, "run layouts require a container");
        Self { size, has_runs }
    }

    /// Parses a run layout cookie. Returns `None` if `cookie` is the plain
    /// layout cookie, whose size is stored in the next word.
    pub fn from_cookie(cookie: u32) -> Result<Option<Self>, DecodeErr> {
        if cookie == SERIAL_COOKIE_NO_RUNCONTAINER {
            Ok(None)
        } else if cookie & 0xFFFF == SERIAL_COOKIE {
            Ok(Some(Self::new((cookie >> 16) as usize + 1, true)))
        } else {
            Err(DecodeErr::InvalidCookie(cookie))
        }
    }

    pub fn from_size(size: u32) -> Result<Self, DecodeErr> {
        let size = size as usize;
        if size > MAX_CONTAINERS {
            return Err(DecodeErr::Validity);
        }
        Ok(Self::new(size, false))
    }

    pub fn cookie(&self) -> u32 {
        if self.has_runs {
            SERIAL_COOKIE | (((self.size - 1) as u32) << 16)
        } else {
            SERIAL_COOKIE_NO_RUNCONTAINER
        }
    }

    #[inline]
    pub fn run_flags_len(&self) -> usize {
        if self.has_runs { self.size.div_ceil(8) } else { 0 }
    }

    #[inline]
    pub fn has_offsets(&self) -> bool {
        !self.has_runs || self.size >= NO_OFFSET_THRESHOLD
    }

    /// The number of bytes preceding the first container payload.
    pub fn header_len(&self) -> usize {
        let counts = if self.has_runs {
            self.run_flags_len()
        } else {
            size_of::<u32>()
        };
        let offsets = if self.has_offsets() { self.size * 4 } else { 0 };
        size_of::<u32>() + counts + self.size * size_of::<Descriptor>() + offsets
    }
}

/// Returns true if the run flag of container `idx` is set.
#[inline]
pub fn run_flag(flags: &[u8], idx: usize) -> bool {
    flags[idx / 8] & (1 << (idx % 8)) != 0
}

#[derive(Debug, FromBytes, IntoBytes, Immutable, Unaligned, KnownLayout)]
#[repr(C)]
pub struct Descriptor {
    key: U16<LittleEndian>,
    cardinality: U16<LittleEndian>,
}

impl Descriptor {
    pub fn new(key: Key, cardinality: usize) -> Self {
        debug_assert!(cardinality > 0, "containers are never empty");
        Self {
            key: key.into(),
            // stored as cardinality - 1 so that 65536 fits
            cardinality: ((cardinality - 1) as u16).into(),
        }
    }

    #[inline]
    pub fn key(&self) -> Key {
        self.key.get()
    }

    #[inline]
    pub fn cardinality(&self) -> usize {
        self.cardinality.get() as usize + 1
    }
}

#[derive(Debug, FromBytes, IntoBytes, Immutable, Unaligned, KnownLayout)]
#[repr(C)]
pub struct EncodedRun {
    start: U16<LittleEndian>,
    length: U16<LittleEndian>,
}

impl EncodedRun {
    /// The run `start..=start + length`.
    pub fn new(start: Low, length: Low) -> Self {
        Self { start: start.into(), length: length.into() }
    }

    /// Returns the values covered by this run, or `None` if the run extends
    /// past the end of the container.
    pub fn range(&self) -> Option<RangeInclusive<Low>> {
        let start = self.start.get();
        let end = start.checked_add(self.length.get())?;
        Some(start..=end)
    }
}
