#![allow(clippy::module_name_repetitions)]

pub(crate) mod colorspace;
pub(crate) mod converter;
pub(crate) mod layout;

pub use colorspace::{NativeColorspace, COMPOSITE_TO_RGB, NATIVE_COLOR_MASK};
pub use converter::ColorConverter;
pub use layout::{ColorLayout, Component};

use crate::error::{Error, Result};

/// Normalized 8-bit-per-channel color
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha, 255 is fully opaque
    pub a: u8,
}

impl Color {
    /// Opaque black
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Creates an opaque color
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, u8::MAX)
    }

    /// Creates a color with explicit alpha
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Color> for image::Rgba<u8> {
    fn from(c: Color) -> Self {
        Self([c.r, c.g, c.b, c.a])
    }
}

impl From<Color> for [u8; 4] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// Ordered palette of [`Color`]s, indexed by unpacked pixel values
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Colormap {
    colors: Vec<Color>,
}

impl Colormap {
    /// Creates a colormap holding `colors` in order
    #[must_use]
    pub const fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns `true` if the colormap has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Returns all entries
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Looks up the color for an unpacked pixel value
    ///
    /// # Errors
    ///
    /// [`Error::ColorIndexOutOfRange`] if `index` is past the end of the colormap
    pub fn get(&self, index: usize) -> Result<Color> {
        self.colors
            .get(index)
            .copied()
            .ok_or(Error::ColorIndexOutOfRange {
                index,
                len: self.colors.len(),
            })
    }
}

impl From<Vec<Color>> for Colormap {
    fn from(colors: Vec<Color>) -> Self {
        Self::new(colors)
    }
}

impl FromIterator<Color> for Colormap {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
