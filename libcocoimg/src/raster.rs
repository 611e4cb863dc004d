use std::path::Path;

use image::{ImageFormat, RgbaImage};
use tracing::{debug, instrument};

use crate::{
    color::Color,
    error::{Error, Result},
};

/// Decoded RGBA image, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// The width of the image
    width: usize,
    /// The height of the image
    height: usize,
    /// Image pixels
    pixels: Vec<Color>,
}

impl Raster {
    /// Creates a `width` x `height` raster filled with transparent black
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if either dimension is zero or the pixel count overflows
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument(format!(
                "invalid raster dimensions {width}x{height}"
            )));
        }
        let len = width.checked_mul(height).ok_or_else(|| {
            Error::InvalidArgument(format!("raster dimensions {width}x{height} are too large"))
        })?;
        Ok(Self {
            width,
            height,
            pixels: vec![Color::default(); len],
        })
    }

    /// Returns the width of the image
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the image
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns every pixel, row by row
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Returns the pixel at `(x, y)`, if inside the image
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            self.pixels.get(y * self.width + x).copied()
        } else {
            None
        }
    }

    /// Returns a cursor that writes pixels from the top-left corner onwards
    pub fn cursor(&mut self) -> PixelCursor<'_> {
        PixelCursor::new(&mut self.pixels)
    }

    /// Returns a cursor that takes `stride` pixels per row and drops everything past the
    /// raster's width
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `stride` is narrower than the raster
    pub fn row_cursor(&mut self, stride: usize) -> Result<PixelCursor<'_>> {
        PixelCursor::with_stride(&mut self.pixels, self.width, stride)
    }

    /// Copies the raster into an [`image::RgbaImage`]
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if a dimension does not fit the `image` crate's `u32`
    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        let (width, height) = (
            u32::try_from(self.width)
                .map_err(|e| Error::InvalidArgument(format!("width is too big: {e}")))?,
            u32::try_from(self.height)
                .map_err(|e| Error::InvalidArgument(format!("height is too big: {e}")))?,
        );
        let raw = self
            .pixels
            .iter()
            .flat_map(|&c| <[u8; 4]>::from(c))
            .collect::<Vec<_>>();
        RgbaImage::from_raw(width, height, raw).ok_or_else(|| {
            Error::InvalidArgument("pixel buffer does not match raster dimensions".into())
        })
    }

    /// Writes the raster as a PNG file
    ///
    /// # Errors
    ///
    /// This will error if unable to create or write to the provided path
    #[instrument(skip_all, fields(width = self.width, height = self.height))]
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let img = self.to_rgba_image()?;
        img.save_with_format(path.as_ref(), ImageFormat::Png)?;
        debug!("Wrote PNG to {}", path.as_ref().display());
        Ok(())
    }
}

/// Sequential writer over a preallocated pixel buffer.
///
/// Rows may be padded: a cursor with a stride wider than the row accepts `stride` pixels per
/// row and keeps only the first `width` of them, so the padding pixels that complete a row's
/// last packed byte never spill into the next row.
#[derive(Debug)]
pub struct PixelCursor<'a> {
    pixels: &'a mut [Color],
    width: usize,
    stride: usize,
    /// Pixels to write including padding
    len: usize,
    position: usize,
}

impl<'a> PixelCursor<'a> {
    /// Creates a cursor over `pixels` without row padding
    pub fn new(pixels: &'a mut [Color]) -> Self {
        let len = pixels.len();
        Self {
            pixels,
            width: len,
            stride: len,
            len,
            position: 0,
        }
    }

    /// Creates a cursor over rows of `width` pixels, each followed by `stride - width` padding
    /// pixels that are written to nowhere
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `width` is zero, `stride` is narrower than `width`, or
    /// `pixels` does not hold a whole number of rows
    pub fn with_stride(pixels: &'a mut [Color], width: usize, stride: usize) -> Result<Self> {
        if width == 0 || stride < width || pixels.len() % width != 0 {
            return Err(Error::InvalidArgument(format!(
                "cannot write rows of {width} pixels with a stride of {stride} into {} pixels",
                pixels.len()
            )));
        }
        let len = (pixels.len() / width).checked_mul(stride).ok_or_else(|| {
            Error::InvalidArgument(format!("row stride {stride} is too large"))
        })?;
        Ok(Self {
            pixels,
            width,
            stride,
            len,
            position: 0,
        })
    }

    /// Number of pixels still to be written, padding included
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.len - self.position
    }

    /// Returns `true` once every pixel has been written
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// Number of pixels written so far, padding included
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Writes `color` and advances. Padding pixels are counted and discarded.
    ///
    /// # Errors
    ///
    /// [`Error::Overflow`] if the cursor is already full
    pub fn write(&mut self, color: Color) -> Result<()> {
        if self.is_full() {
            return Err(Error::Overflow(format!(
                "pixel cursor is full after {} pixels",
                self.position
            )));
        }
        let (row, column) = (self.position / self.stride, self.position % self.stride);
        if column < self.width {
            if let Some(slot) = self.pixels.get_mut(row * self.width + column) {
                *slot = color;
            }
        }
        self.position += 1;
        Ok(())
    }
}
