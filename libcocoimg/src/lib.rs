//! # libcocoimg
//!
//!
//! This library provides the color and pixel codec shared by the readers of images produced by
//! Tandy Color Computer 3 paint programs (ColorMax, CoCo Max III, Rat and friends).
//!
//! It aims to provide a minimal, low-level API to build format readers upon: header parsing is
//! left to the caller, which hands this crate a palette, a pixel packing and a byte stream and
//! gets back a normalized RGBA [`Raster`].
//!
//! ### Building blocks
//!
//! - [`BitField`]: an N-bit value stored at one or more fixed bit positions of an integer. The
//!   hardware palette byte stores every component in two non-adjacent bits, which is why split
//!   fields exist.
//! - [`ColorLayout`] and [`ColorConverter`]: lossless conversion between packed hardware colors
//!   and 8-bit RGBA. Anything that would lose precision is reported, never rounded.
//! - [`PackedPixelLayout`]: how 1, 2, 4 or 8 bit indexed pixels share a byte.
//! - [`decode`]: the unpack primitive and the run-length grammars used by the various formats.
//!
//! ### Usage
//!
//! ```rust
//! use libcocoimg::{
//!     decode::{decode_image, DecodeRequest, Encoding},
//!     ByteReader, ColorConverter, ColorLayout, NativeColorspace, PackedPixelLayout,
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     // 16 palette registers as stored by the file, in RGB monitor encoding
//!     let native_palette: Vec<u8> = (0..16).collect();
//!     let colormap = ColorConverter::new(ColorLayout::coco3())
//!         .create_colormap(NativeColorspace::Rgb, &native_palette)?;
//!
//!     // two runs of four pixels each: (count, packed) pairs repeating count + 1 times
//!     let data = [0x01, 0x12, 0x01, 0x34];
//!     let request = DecodeRequest::builder()
//!         .source_name("example".to_owned())
//!         .width(4)
//!         .height(2)
//!         .layout(PackedPixelLayout::bpp4())
//!         .encoding(Encoding::CountPairs)
//!         .colormap(&colormap)
//!         .build();
//!     let raster = decode_image(&mut ByteReader::new(&data[..]), &request)?;
//!     assert_eq!(raster.pixel(0, 1), Some(colormap.colors()[3]));
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

/// Module containing bit field types
pub mod bitfield;
/// Module containing color types, layouts and the color converter
pub mod color;
/// Module containing the pixel-stream decoders
pub mod decode;
mod error;
mod parse;
mod pixel_layout;
mod raster;
mod reader;

pub use bitfield::{BitField, PackedValue};
pub use color::{Color, ColorConverter, ColorLayout, Colormap, Component, NativeColorspace};
pub use error::{Error, Result};
pub use parse::parse_byte_list;
pub use pixel_layout::PackedPixelLayout;
pub use raster::{PixelCursor, Raster};
pub use reader::{ByteReader, Readable};
