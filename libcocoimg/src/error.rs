use thiserror::Error;

use crate::{color::NativeColorspace, decode::Phase};

/// Shorthand for results carrying a [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
/// Possible `libcocoimg` errors
pub enum Error {
    /// Malformed construction input (empty names, zero-length fields, non-uniform pixel widths,
    /// invalid alignment or bits-per-pixel)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A value does not fit the bit width it is stored in
    #[error("overflow: {0}")]
    Overflow(String),
    /// A component value is outside of the range its type or layout can represent
    #[error("range error: {0}")]
    Range(String),
    /// A pack or unpack targeted a component of unsupported size
    #[error("length error: {0}")]
    Length(String),
    /// A packed color has bits set that the layout does not define
    #[error("packed color value contains unsupported bits: {value:#x} (layout mask {mask:#x})")]
    PackedColorFormat {
        /// offending packed value
        value: u32,
        /// bits the layout accepts
        mask: u32,
    },
    /// A decoded pixel refers to a color outside of the colormap
    #[error("color index {index} is out of range for a colormap of {len} entries")]
    ColorIndexOutOfRange {
        /// unpacked pixel value
        index: usize,
        /// number of colormap entries
        len: usize,
    },
    /// Only identity and composite to rgb conversions exist
    #[error("unsupported colorspace conversion from {from} to {to}")]
    UnsupportedColorspaceConversion {
        /// source colorspace
        from: NativeColorspace,
        /// target colorspace
        to: NativeColorspace,
    },
    /// The byte stream ended before a read could be satisfied
    #[error("unexpected end of input: needed {needed} byte(s) at offset {offset}")]
    TruncatedInput {
        /// stream position at which the read started
        offset: u64,
        /// bytes the read required
        needed: usize,
    },
    /// Failure while decoding the pixel data of a named source
    #[error("unexpected end of file while processing {phase} image data of `{source_name}`")]
    Decode {
        /// which part of the image was being decoded
        phase: Phase,
        /// user facing name of the decoded asset
        source_name: String,
        /// underlying failure
        #[source]
        source: Box<Error>,
    },
    /// Any other I/O failure from the underlying reader or writer
    #[error("i/o error")]
    Io(#[from] std::io::Error),
    /// PNG export failure
    #[error("image encoding error")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Returns `true` if this error (or the error it wraps) is a truncated input
    #[must_use]
    pub fn is_truncation(&self) -> bool {
        match self {
            Self::TruncatedInput { .. } => true,
            Self::Decode { source, .. } => source.is_truncation(),
            _ => false,
        }
    }
}
