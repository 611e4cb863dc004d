use std::io::Read;

use tracing::{instrument, trace, warn};

use super::{unpack, unpack_repeat};
use crate::{
    color::Colormap,
    error::{Error, Result},
    pixel_layout::PackedPixelLayout,
    raster::PixelCursor,
    reader::ByteReader,
};

/// Set in a packet header when the packet is a run of one repeated byte
const REPEAT_PACKET: u8 = 0x80;
const PACKET_LENGTH_MASK: u8 = 0x7F;

/// Uncompressed data: every byte is one packed pixel group
///
/// # Errors
///
/// [`crate::Error::TruncatedInput`] if the stream ends before `cursor` is full
#[instrument(skip_all, level = "debug")]
pub fn decode_raw<R: Read>(
    reader: &mut ByteReader<R>,
    layout: &PackedPixelLayout,
    colormap: &Colormap,
    cursor: &mut PixelCursor<'_>,
) -> Result<()> {
    while !cursor.is_full() {
        let packed: u8 = reader.read()?;
        unpack(packed, layout, colormap, cursor)?;
    }
    Ok(())
}

/// `(count, packed)` pairs, each writing the group `count + 1` times
///
/// # Errors
///
/// [`crate::Error::TruncatedInput`] if the stream ends before `cursor` is full
#[instrument(skip_all, level = "debug")]
pub fn decode_count_pairs<R: Read>(
    reader: &mut ByteReader<R>,
    layout: &PackedPixelLayout,
    colormap: &Colormap,
    cursor: &mut PixelCursor<'_>,
) -> Result<()> {
    while !cursor.is_full() {
        let (count, packed) = reader.read_pair::<u8, u8>()?;
        trace!("run of {} x {packed:#04x}", usize::from(count) + 1);
        unpack_repeat(packed, usize::from(count) + 1, layout, colormap, cursor)?;
    }
    Ok(())
}

/// Literal packed bytes, except that `escape` introduces a `(count, packed)` run.
///
/// A literal whose value equals `escape` cannot be expressed: such a byte always starts a run.
///
/// # Errors
///
/// [`crate::Error::TruncatedInput`] if the stream ends before `cursor` is full
#[instrument(skip(reader, layout, colormap, cursor), level = "debug")]
pub fn decode_escaped<R: Read>(
    reader: &mut ByteReader<R>,
    escape: u8,
    layout: &PackedPixelLayout,
    colormap: &Colormap,
    cursor: &mut PixelCursor<'_>,
) -> Result<()> {
    while !cursor.is_full() {
        let byte: u8 = reader.read()?;
        if byte == escape {
            let (count, packed) = reader.read_pair::<u8, u8>()?;
            trace!("run of {count} x {packed:#04x}");
            unpack_repeat(packed, usize::from(count), layout, colormap, cursor)?;
        } else {
            unpack(byte, layout, colormap, cursor)?;
        }
    }
    Ok(())
}

/// Rows stored as `(block_size, block)` where the block holds packets of literal or repeated
/// bytes. Each row needs `row_bytes` pixel groups; runs reaching past the end of the row are
/// clamped, and whatever is left of the block after the row is complete is discarded. A block
/// that ends before its row is complete leaves the row open for the next block.
///
/// # Errors
///
/// [`crate::Error::InvalidArgument`] if `row_bytes` is zero, [`crate::Error::TruncatedInput`] if
/// the stream or a block ends in the middle of a packet, or the stream ends before `cursor` is
/// full
#[instrument(skip(reader, layout, colormap, cursor), level = "debug")]
pub fn decode_packets<R: Read>(
    reader: &mut ByteReader<R>,
    row_bytes: usize,
    layout: &PackedPixelLayout,
    colormap: &Colormap,
    cursor: &mut PixelCursor<'_>,
) -> Result<()> {
    if row_bytes == 0 {
        return Err(Error::InvalidArgument(
            "packet rows must hold at least one byte".into(),
        ));
    }
    // pixel groups still missing from the current row
    let mut needed = row_bytes;
    while !cursor.is_full() {
        let block_size: u8 = reader.read()?;
        let block = reader.read_vector::<u8>(usize::from(block_size))?;
        trace!(
            "block of {block_size} bytes at pixel {}, {needed} groups left in the row",
            cursor.position()
        );
        needed = decode_packet_block(&block, needed, layout, colormap, cursor)?;
        if needed == 0 {
            needed = row_bytes;
        }
    }
    Ok(())
}

/// Decodes the packets of one block into at most `needed` pixel groups and returns how many
/// groups the row still lacks
fn decode_packet_block(
    block: &[u8],
    mut needed: usize,
    layout: &PackedPixelLayout,
    colormap: &Colormap,
    cursor: &mut PixelCursor<'_>,
) -> Result<usize> {
    let mut packets = ByteReader::new(block);
    while needed > 0 && !cursor.is_full() && packets.position() < block.len() as u64 {
        let header: u8 = packets.read()?;
        let length = usize::from(header & PACKET_LENGTH_MASK);
        let run = length.min(needed);
        if run < length {
            warn!("packet of {length} exceeds the {needed} pixel groups left in the row, clamping");
        }
        if header & REPEAT_PACKET == 0 {
            for _ in 0..run {
                let packed: u8 = packets.read()?;
                unpack(packed, layout, colormap, cursor)?;
            }
        } else {
            let packed: u8 = packets.read()?;
            unpack_repeat(packed, run, layout, colormap, cursor)?;
        }
        needed -= run;
    }
    Ok(needed)
}
