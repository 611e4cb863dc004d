use std::borrow::Cow;

use itertools::Itertools;

use crate::{
    bitfield::{BitField, BitFieldKind, Chunk},
    error::{Error, Result},
};

/// How several equal-width indexed pixels are packed into one byte, most significant pixel
/// first
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackedPixelLayout {
    pixels: Cow<'static, [BitField<u8>]>,
    bits_per_pixel: u32,
}

const fn pixel(width: u32, position: u32) -> BitField<u8> {
    BitField::from_kind(BitFieldKind::Contiguous(Chunk { width, position }))
}

static BPP1_PIXELS: [BitField<u8>; 8] = [
    pixel(1, 7),
    pixel(1, 6),
    pixel(1, 5),
    pixel(1, 4),
    pixel(1, 3),
    pixel(1, 2),
    pixel(1, 1),
    pixel(1, 0),
];
static BPP2_PIXELS: [BitField<u8>; 4] = [pixel(2, 6), pixel(2, 4), pixel(2, 2), pixel(2, 0)];
static BPP4_PIXELS: [BitField<u8>; 2] = [pixel(4, 4), pixel(4, 0)];
static BPP8_PIXELS: [BitField<u8>; 1] = [pixel(8, 0)];

static BPP1: PackedPixelLayout = PackedPixelLayout {
    pixels: Cow::Borrowed(&BPP1_PIXELS),
    bits_per_pixel: 1,
};
static BPP2: PackedPixelLayout = PackedPixelLayout {
    pixels: Cow::Borrowed(&BPP2_PIXELS),
    bits_per_pixel: 2,
};
static BPP4: PackedPixelLayout = PackedPixelLayout {
    pixels: Cow::Borrowed(&BPP4_PIXELS),
    bits_per_pixel: 4,
};
static BPP8: PackedPixelLayout = PackedPixelLayout {
    pixels: Cow::Borrowed(&BPP8_PIXELS),
    bits_per_pixel: 8,
};

impl PackedPixelLayout {
    /// Eight 1-bit pixels per byte
    #[must_use]
    pub fn bpp1() -> &'static Self {
        &BPP1
    }

    /// Four 2-bit pixels per byte
    #[must_use]
    pub fn bpp2() -> &'static Self {
        &BPP2
    }

    /// Two 4-bit pixels per byte
    #[must_use]
    pub fn bpp4() -> &'static Self {
        &BPP4
    }

    /// One 8-bit pixel per byte
    #[must_use]
    pub fn bpp8() -> &'static Self {
        &BPP8
    }

    /// Returns the shared layout for `bits_per_pixel`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] unless `bits_per_pixel` is 1, 2, 4 or 8
    pub fn for_bits_per_pixel(bits_per_pixel: u32) -> Result<&'static Self> {
        match bits_per_pixel {
            1 => Ok(Self::bpp1()),
            2 => Ok(Self::bpp2()),
            4 => Ok(Self::bpp4()),
            8 => Ok(Self::bpp8()),
            _ => Err(Error::InvalidArgument(format!(
                "no packed pixel layout for {bits_per_pixel} bits per pixel"
            ))),
        }
    }

    /// Creates a layout out of explicit per-pixel fields, most significant pixel first
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `pixels` is empty, holds an empty field, or the fields do
    /// not all have the same width
    pub fn new(pixels: Vec<BitField<u8>>) -> Result<Self> {
        let Some(bits_per_pixel) = pixels.first().map(BitField::size) else {
            return Err(Error::InvalidArgument(
                "packed pixel layout needs at least one pixel".into(),
            ));
        };
        if bits_per_pixel == 0 {
            return Err(Error::InvalidArgument(
                "packed pixel layout cannot contain empty pixels".into(),
            ));
        }
        if !pixels.iter().map(BitField::size).all_equal() {
            return Err(Error::InvalidArgument(
                "all pixels of a packed pixel layout must have the same width".into(),
            ));
        }
        Ok(Self {
            pixels: Cow::Owned(pixels),
            bits_per_pixel,
        })
    }

    /// Creates a layout covering the whole byte with pixels of `bits_per_pixel` bits
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `bits_per_pixel` is zero, not a power of two, or wider
    /// than a byte
    pub fn from_bits_per_pixel(bits_per_pixel: u32) -> Result<Self> {
        if bits_per_pixel == 0 || !bits_per_pixel.is_power_of_two() || bits_per_pixel > u8::BITS
        {
            return Err(Error::InvalidArgument(format!(
                "invalid bits per pixel {bits_per_pixel}"
            )));
        }
        let count = u8::BITS / bits_per_pixel;
        let pixels = (1..=count)
            .map(|i| BitField::contiguous(bits_per_pixel, u8::BITS - i * bits_per_pixel))
            .collect::<Result<Vec<_>>>()?;
        Self::new(pixels)
    }

    /// Per-pixel fields, most significant pixel first
    #[must_use]
    pub fn pixels(&self) -> &[BitField<u8>] {
        &self.pixels
    }

    /// Width of one pixel in bits
    #[must_use]
    pub const fn bits_per_pixel(&self) -> u32 {
        self.bits_per_pixel
    }

    /// Number of pixels stored in one byte
    #[must_use]
    pub fn pixels_per_packed_value(&self) -> usize {
        self.pixels.len()
    }

    /// Number of distinct values one pixel can take
    #[must_use]
    pub const fn max_colors_in_pixel(&self) -> usize {
        1 << self.bits_per_pixel
    }

    /// Extracts the pixel values stored in `packed`, most significant pixel first
    pub fn unpack_indices(&self, packed: u8) -> impl Iterator<Item = usize> + '_ {
        self.pixels
            .iter()
            .map(move |field| usize::from(field.get_from(packed)))
    }

    /// Bytes needed to store a row of `width_in_pixels` pixels, padded to `alignment_in_bytes`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if either argument is zero or the alignment is not a power
    /// of two
    pub fn calculate_pitch(
        &self,
        width_in_pixels: usize,
        alignment_in_bytes: usize,
    ) -> Result<usize> {
        if width_in_pixels == 0 {
            return Err(Error::InvalidArgument("row width cannot be zero".into()));
        }
        if alignment_in_bytes == 0 || !alignment_in_bytes.is_power_of_two() {
            return Err(Error::InvalidArgument(format!(
                "row alignment {alignment_in_bytes} is not a non-zero power of two"
            )));
        }
        let pitch = width_in_pixels.div_ceil(self.pixels_per_packed_value());
        Ok(pitch.next_multiple_of(alignment_in_bytes))
    }
}
