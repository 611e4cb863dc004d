use strum::{Display, EnumString, IntoStaticStr};
use tracing::debug;

use crate::error::{Error, Result};

/// Bits of a native palette entry that carry color information
pub const NATIVE_COLOR_MASK: u8 = 0x3F;

/// Color encoding of a native palette
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum NativeColorspace {
    /// Palette entries are `..R1G1B1R0G0B0` bit patterns
    #[default]
    Rgb,
    /// Palette entries are composite monitor colors (intensity in bits 4-5, hue in bits 0-3)
    /// and need [`COMPOSITE_TO_RGB`] before their components can be read
    #[strum(to_string = "composite", serialize = "cmp")]
    Composite,
}

/// Maps a composite palette entry of the GIME to the RGB palette entry that displays the
/// same color on an RGB monitor.
///
/// Rows are the four intensities. Within a row, hue 0 is the grey of that intensity and the
/// other hues step around the color wheel from red at hue 7. The default palettes that BASIC
/// loads with `PALETTE CMP` and `PALETTE RGB` pair up entry for entry with this table.
#[rustfmt::skip]
pub const COMPOSITE_TO_RGB: [u8; 64] = [
     0, 17, 16, 20, 48, 34, 32, 36, 33, 45, 12,  9, 10, 24, 17, 16,
     7, 19, 18, 22, 54, 52, 38, 37, 44, 45, 13,  9, 11, 27, 26, 27,
    56, 26, 18, 50, 54, 52, 38, 37, 44, 45, 13, 11, 25, 27, 26, 19,
    63, 30, 23, 51, 55, 53, 53, 46, 47, 47, 43, 29, 29, 31, 30, 63,
];

/// Rewrites `native_colormap` in place from the `from` encoding into the `to` encoding
pub(crate) fn convert(
    from: NativeColorspace,
    to: NativeColorspace,
    native_colormap: &mut [u8],
) -> Result<()> {
    if from == to {
        return Ok(());
    }
    if (from, to) != (NativeColorspace::Composite, NativeColorspace::Rgb) {
        return Err(Error::UnsupportedColorspaceConversion { from, to });
    }
    debug!(
        "Converting {} palette entries from {from} to {to}",
        native_colormap.len()
    );
    for entry in native_colormap.iter_mut() {
        *entry = COMPOSITE_TO_RGB[usize::from(*entry & NATIVE_COLOR_MASK)];
    }
    Ok(())
}
