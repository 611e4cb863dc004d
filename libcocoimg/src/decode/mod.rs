//! Pixel-stream decoding.
//!
//! Every grammar is built on the same primitive: take one packed byte, split it into its
//! indexed pixels with a [`PackedPixelLayout`], resolve each index through a [`Colormap`] and
//! write the colors into a [`PixelCursor`], optionally repeating the group. Decoding runs until
//! the destination is full; running out of input first is fatal.

pub(crate) mod encoding;
pub(crate) mod rle;

use std::io::Read;

use bon::Builder;
use strum::Display;
use tracing::{debug, instrument, warn};

pub use encoding::Encoding;
pub use rle::{decode_count_pairs, decode_escaped, decode_packets, decode_raw};

use crate::{
    color::{Color, Colormap},
    error::{Error, Result},
    pixel_layout::PackedPixelLayout,
    raster::{PixelCursor, Raster},
    reader::ByteReader,
};

/// Part of an image that was being decoded when a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    /// Run-length encoded pixel data
    Compressed,
    /// Raw packed pixel data
    Uncompressed,
}

/// Decodes the pixels of `packed` and writes them to `cursor`, most significant pixel first.
///
/// Pixels that would land past the end of the destination are dropped.
///
/// # Errors
///
/// [`Error::ColorIndexOutOfRange`] if a pixel has no colormap entry
pub fn unpack(
    packed: u8,
    layout: &PackedPixelLayout,
    colormap: &Colormap,
    cursor: &mut PixelCursor<'_>,
) -> Result<()> {
    for index in layout.unpack_indices(packed) {
        if cursor.is_full() {
            break;
        }
        cursor.write(colormap.get(index)?)?;
    }
    Ok(())
}

/// Decodes the pixels of `packed` once and writes the group `count` times
///
/// # Errors
///
/// See [`unpack`]
pub fn unpack_repeat(
    packed: u8,
    count: usize,
    layout: &PackedPixelLayout,
    colormap: &Colormap,
    cursor: &mut PixelCursor<'_>,
) -> Result<()> {
    if count == 0 {
        return Ok(());
    }
    let group = layout
        .unpack_indices(packed)
        .map(|index| colormap.get(index))
        .collect::<Result<Vec<Color>>>()?;
    for &color in group.iter().cycle().take(group.len() * count) {
        if cursor.is_full() {
            break;
        }
        cursor.write(color)?;
    }
    Ok(())
}

/// Runs the grammar selected by `encoding` until `cursor` is full
///
/// # Errors
///
/// [`Error::TruncatedInput`] if the stream ends first, or any error of [`unpack`]
pub fn decode_pixels<R: Read>(
    reader: &mut ByteReader<R>,
    encoding: Encoding,
    layout: &PackedPixelLayout,
    colormap: &Colormap,
    cursor: &mut PixelCursor<'_>,
) -> Result<()> {
    match encoding {
        Encoding::Raw => decode_raw(reader, layout, colormap, cursor),
        Encoding::CountPairs => decode_count_pairs(reader, layout, colormap, cursor),
        Encoding::Escaped { escape } => decode_escaped(reader, escape, layout, colormap, cursor),
        Encoding::Packets { row_bytes } => {
            decode_packets(reader, row_bytes, layout, colormap, cursor)
        }
    }
}

/// Everything needed to decode one image's pixel data
#[derive(Debug, Clone, Builder)]
pub struct DecodeRequest<'a> {
    /// User facing name of the asset, used in error messages
    pub source_name: String,
    /// Width of the destination in pixels
    pub width: usize,
    /// Height of the destination in pixels
    pub height: usize,
    /// Packing of the indexed pixels
    pub layout: &'a PackedPixelLayout,
    /// Grammar of the pixel stream
    pub encoding: Encoding,
    /// Palette the indexed pixels refer to
    pub colormap: &'a Colormap,
}

/// Allocates a raster and fills it from `reader`.
///
/// Every row is decoded as a whole number of packed bytes; pixels padding the last byte of a
/// row are dropped. A stream that ends early is reported as [`Error::Decode`], naming the phase and the source.
/// No partial image is returned.
///
/// # Errors
///
/// Any error of [`Raster::new`] or [`decode_pixels`]
#[instrument(skip(reader, request), fields(source = %request.source_name, encoding = %request.encoding))]
pub fn decode_image<R: Read>(reader: &mut ByteReader<R>, request: &DecodeRequest<'_>) -> Result<Raster> {
    let mut raster = Raster::new(request.width, request.height)?;
    let stride = request
        .layout
        .calculate_pitch(request.width, 1)?
        .checked_mul(request.layout.pixels_per_packed_value())
        .ok_or_else(|| {
            Error::InvalidArgument(format!("row of {} pixels is too wide", request.width))
        })?;
    debug!(
        "Decoding {}x{} pixels at {} bpp",
        request.width,
        request.height,
        request.layout.bits_per_pixel()
    );
    if request.colormap.len() < request.layout.max_colors_in_pixel() {
        warn!(
            "Colormap has {} entries but pixels can index {}",
            request.colormap.len(),
            request.layout.max_colors_in_pixel()
        );
    }
    decode_pixels(
        reader,
        request.encoding,
        request.layout,
        request.colormap,
        &mut raster.row_cursor(stride)?,
    )
    .map_err(|e| {
        if e.is_truncation() {
            Error::Decode {
                phase: request.encoding.phase(),
                source_name: request.source_name.clone(),
                source: Box::new(e),
            }
        } else {
            e
        }
    })?;
    debug!("Decoded {} bytes of pixel data", reader.position());
    Ok(raster)
}
