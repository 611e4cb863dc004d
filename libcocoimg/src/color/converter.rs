use tracing::{debug, instrument};

use super::{colorspace, layout::ColorLayout, Color, Colormap, NativeColorspace};
use crate::{
    bitfield::{BitField, PackedValue},
    error::{Error, Result},
};

/// Lossless conversion between packed colors and [`Color`]s, driven by a [`ColorLayout`].
///
/// Conversions never round: a packed component that cannot be widened exactly, or a channel
/// value that does not land exactly on one of a component's steps, is an error.
#[derive(Debug, Clone, Copy)]
pub struct ColorConverter<'a, T> {
    layout: &'a ColorLayout<T>,
}

impl<'a, T: PackedValue> ColorConverter<'a, T> {
    /// Creates a converter for `layout`
    #[must_use]
    pub const fn new(layout: &'a ColorLayout<T>) -> Self {
        Self { layout }
    }

    /// Returns the layout this converter works with
    #[must_use]
    pub const fn layout(&self) -> &'a ColorLayout<T> {
        self.layout
    }

    /// Expands a packed color into a [`Color`]. A layout without alpha yields opaque colors.
    ///
    /// # Errors
    ///
    /// [`Error::PackedColorFormat`] if `packed` has bits outside of the layout, or any error of
    /// the component expansion
    pub fn to_color(&self, packed: T) -> Result<Color> {
        let mask = self.layout.packed_color_bitmask().to_u64();
        if packed.to_u64() & !mask != 0 {
            return Err(Error::PackedColorFormat {
                value: u32::try_from(packed.to_u64()).unwrap_or(u32::MAX),
                mask: u32::try_from(mask).unwrap_or(u32::MAX),
            });
        }
        let alpha = self.layout.alpha();
        Ok(Color {
            r: unpack_component_value(self.layout.red(), packed)?,
            g: unpack_component_value(self.layout.green(), packed)?,
            b: unpack_component_value(self.layout.blue(), packed)?,
            a: if alpha.size() == 0 {
                u8::MAX
            } else {
                unpack_component_value(alpha, packed)?
            },
        })
    }

    /// Packs a [`Color`]. Alpha is ignored when the layout has no alpha component.
    ///
    /// # Errors
    ///
    /// [`Error::Range`] if a channel cannot be represented exactly by its component
    pub fn from_color(&self, color: Color) -> Result<T> {
        self.from_rgba(color.r, color.g, color.b, color.a)
    }

    /// Packs an opaque color given by its channels
    ///
    /// # Errors
    ///
    /// See [`Self::from_color`]
    pub fn from_rgb(&self, r: u8, g: u8, b: u8) -> Result<T> {
        self.from_rgba(r, g, b, u8::MAX)
    }

    /// Packs a color given by its channels
    ///
    /// # Errors
    ///
    /// See [`Self::from_color`]
    pub fn from_rgba(&self, r: u8, g: u8, b: u8, a: u8) -> Result<T> {
        let alpha = self.layout.alpha();
        let a = if alpha.size() == 0 {
            0
        } else {
            pack_component_value(alpha, a)?.to_u64()
        };
        let packed = pack_component_value(self.layout.red(), r)?.to_u64()
            | pack_component_value(self.layout.green(), g)?.to_u64()
            | pack_component_value(self.layout.blue(), b)?.to_u64()
            | a;
        Ok(T::truncate_from(packed))
    }

    /// Rewrites a native palette from one hardware color encoding into another.
    ///
    /// Identical encodings leave the palette untouched; composite to rgb masks every entry to
    /// the native 6-bit range and maps it through [`super::COMPOSITE_TO_RGB`].
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedColorspaceConversion`] for any other pair of encodings
    pub fn convert_color_to_colorspace(
        from: NativeColorspace,
        to: NativeColorspace,
        native_colormap: &mut [u8],
    ) -> Result<()> {
        colorspace::convert(from, to, native_colormap)
    }
}

impl ColorConverter<'_, u8> {
    /// Normalizes a native palette stored in `colorspace` and expands every entry
    ///
    /// # Errors
    ///
    /// Any error of [`Self::convert_color_to_colorspace`] or [`Self::to_color`]
    #[instrument(skip(self), level = "debug")]
    pub fn convert_colors(
        &self,
        colorspace: NativeColorspace,
        native_colormap: &[u8],
    ) -> Result<Vec<Color>> {
        let mut native = native_colormap.to_vec();
        Self::convert_color_to_colorspace(colorspace, NativeColorspace::Rgb, &mut native)?;
        let colors = native
            .into_iter()
            .map(|packed| self.to_color(packed))
            .collect::<Result<Vec<_>>>()?;
        debug!("Converted {} native colors", colors.len());
        Ok(colors)
    }

    /// Same as [`Self::convert_colors`], collected into a [`Colormap`]
    ///
    /// # Errors
    ///
    /// See [`Self::convert_colors`]
    pub fn create_colormap(
        &self,
        colorspace: NativeColorspace,
        native_colormap: &[u8],
    ) -> Result<Colormap> {
        self.convert_colors(colorspace, native_colormap)
            .map(Colormap::new)
    }
}

/// Widens one component of `packed` to an 8-bit channel
pub(crate) fn unpack_component_value<T: PackedValue>(
    bitfield: &BitField<T>,
    packed: T,
) -> Result<u8> {
    let size = bitfield.size();
    if size == 0 {
        return Err(Error::Length("unpacked component size cannot be zero".into()));
    }
    if size > u8::BITS {
        return Err(Error::Length(
            "unpacked component size is larger than target component type".into(),
        ));
    }
    let raw = bitfield.get_from(packed).to_u64();
    let max = bitfield.max_value().to_u64();
    if raw > max {
        return Err(Error::Range(format!(
            "unpacked {} value {raw} exceeds its maximum {max}",
            bitfield.name()
        )));
    }
    // floor(raw * (255 / max)), kept in integers so full-scale values stay exact
    let value = raw * u64::from(u8::MAX) / max;
    u8::try_from(value).map_err(|_| {
        Error::Range(format!(
            "unpacked {} value {value} exceeds the target component range",
            bitfield.name()
        ))
    })
}

/// Narrows an 8-bit channel into `bitfield`, positioned inside an otherwise empty packed value
pub(crate) fn pack_component_value<T: PackedValue>(bitfield: &BitField<T>, value: u8) -> Result<T> {
    if bitfield.size() == 0 {
        return Err(Error::Length("packed component size cannot be zero".into()));
    }
    let max = bitfield.max_value().to_u64();
    // value must be an exact multiple of the component step 255 / max
    let numerator = u64::from(value) * max;
    if numerator % u64::from(u8::MAX) != 0 {
        return Err(Error::Range(format!(
            "packing {value} into {}-bit {} results in loss of color precision",
            bitfield.size(),
            bitfield.name()
        )));
    }
    let scaled = numerator / u64::from(u8::MAX);
    if scaled > max {
        return Err(Error::Range(format!(
            "packed {} value {scaled} exceeds its maximum {max}",
            bitfield.name()
        )));
    }
    bitfield.set_in(T::default(), T::truncate_from(scaled))
}
