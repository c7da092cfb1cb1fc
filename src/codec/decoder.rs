use std::{
    io::{self, Read},
    ops::RangeInclusive,
};

use tracing::{debug, trace};
use zerocopy::{FromBytes, IntoBytes, LittleEndian, U16, U32, U64};

use crate::{
    codec::{
        DecodeErr,
        header::{Descriptor, EncodedRun, Layout, run_flag},
    },
    container::{BITMAP_WORDS, Container, MAX_SIZE, bitmap::BitmapContainer},
    count::count_strictly_increasing,
    index::HighLowIndex,
    segment::{Key, Low},
};

/// Reads one encoded bitmap from `reader`, consuming exactly its bytes.
///
/// The offset table is skipped: containers are read in descriptor order.
pub fn decode<R: Read>(mut reader: R) -> Result<HighLowIndex, DecodeErr> {
    let cookie = read_u32(&mut reader)?;
    let layout = match Layout::from_cookie(cookie)? {
        Some(layout) => layout,
        None => Layout::from_size(read_u32(&mut reader)?)?,
    };
    trace!(size = layout.size, has_runs = layout.has_runs, "decoding bitmap header");

    let flags = read_bytes(&mut reader, layout.run_flags_len())?;
    let descriptor_bytes = read_bytes(&mut reader, layout.size * size_of::<Descriptor>())?;
    let descriptors = <[Descriptor]>::ref_from_bytes(&descriptor_bytes)?;

    if count_strictly_increasing(descriptors.iter().map(Descriptor::key)) != layout.size {
        debug!("container keys out of order");
        return Err(DecodeErr::Validity);
    }

    if layout.has_offsets() {
        skip(&mut reader, layout.size * size_of::<u32>())?;
    }

    let mut rows = Vec::with_capacity(layout.size);
    for (idx, descriptor) in descriptors.iter().enumerate() {
        let key = descriptor.key();
        let cardinality = descriptor.cardinality();
        let container = if layout.has_runs && run_flag(&flags, idx) {
            read_run_container(&mut reader, key)?
        } else if cardinality > MAX_SIZE {
            read_bitmap_container(&mut reader, key, cardinality)?
        } else {
            read_array_container(&mut reader, key, cardinality)?
        };
        rows.push((key, container));
    }

    Ok(HighLowIndex::from_rows(rows))
}

fn read_array_container<R: Read>(
    reader: &mut R,
    key: Key,
    cardinality: usize,
) -> Result<Container, DecodeErr> {
    let data = read_bytes(reader, cardinality * size_of::<Low>())?;
    let values = <[U16<LittleEndian>]>::ref_from_bytes(&data)?;
    if count_strictly_increasing(values.iter().map(|v| v.get())) != cardinality {
        debug!(key, "array container values out of order");
        return Err(DecodeErr::Validity);
    }
    Ok(Container::from_sorted_unique(
        values.iter().map(|v| v.get()).collect(),
    ))
}

fn read_bitmap_container<R: Read>(
    reader: &mut R,
    key: Key,
    cardinality: usize,
) -> Result<Container, DecodeErr> {
    let data = read_bytes(reader, BITMAP_WORDS * size_of::<u64>())?;
    let words = <[U64<LittleEndian>]>::ref_from_bytes(&data)?;
    let bitmap = BitmapContainer::from_words(words.iter().map(|w| w.get()).collect());
    if bitmap.len() != cardinality {
        debug!(key, cardinality, actual = bitmap.len(), "bitmap cardinality mismatch");
        return Err(DecodeErr::Validity);
    }
    Ok(Container::Bitmap(bitmap))
}

/// Reads a run container and converts it to the array or bitmap
/// representation its cardinality calls for.
fn read_run_container<R: Read>(reader: &mut R, key: Key) -> Result<Container, DecodeErr> {
    let num_runs = read_u16(reader)? as usize;
    let data = read_bytes(reader, num_runs * size_of::<EncodedRun>())?;
    let encoded = <[EncodedRun]>::ref_from_bytes(&data)?;
    trace!(key, num_runs, "reading run container");

    let mut runs: Vec<RangeInclusive<Low>> = Vec::with_capacity(num_runs);
    let mut cardinality = 0;
    for run in encoded {
        let Some(range) = run.range() else {
            debug!(key, "run extends past the end of the container");
            return Err(DecodeErr::Validity);
        };
        if runs.last().is_some_and(|prev| range.start() <= prev.end()) {
            debug!(key, "runs out of order");
            return Err(DecodeErr::Validity);
        }
        cardinality += (*range.end() - *range.start()) as usize + 1;
        runs.push(range);
    }

    let container = match cardinality {
        0 => {
            debug!(key, "empty run container");
            return Err(DecodeErr::Validity);
        }
        n if n > MAX_SIZE => Container::Bitmap(BitmapContainer::from_ranges(runs)),
        _ => Container::from_sorted_unique(runs.into_iter().flatten().collect()),
    };

    // the singleton shapes are usually what a run container encodes
    Ok(container.canonical_one().unwrap_or(container))
}

fn read_bytes<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>, DecodeErr> {
    let mut buf = vec![0; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16, DecodeErr> {
    let mut v = U16::<LittleEndian>::ZERO;
    reader.read_exact(v.as_mut_bytes())?;
    Ok(v.get())
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, DecodeErr> {
    let mut v = U32::<LittleEndian>::ZERO;
    reader.read_exact(v.as_mut_bytes())?;
    Ok(v.get())
}

fn skip<R: Read>(reader: &mut R, len: usize) -> Result<(), DecodeErr> {
    let skipped = io::copy(&mut reader.by_ref().take(len as u64), &mut io::sink())?;
    if skipped < len as u64 {
        return Err(DecodeErr::Length);
    }
    Ok(())
}
