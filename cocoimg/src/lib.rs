use std::{
    fs::File,
    io::{BufReader, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use libcocoimg::{
    decode::{decode_image, DecodeRequest, Encoding},
    ByteReader, Color, ColorConverter, ColorLayout, Colormap, NativeColorspace, PackedPixelLayout,
};
use tracing::{debug, info, instrument};

/// Where the palette of a decoded image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteSource {
    /// Native palette entries given on the command line
    List(Vec<u8>),
    /// Native palette entries stored in the input at this offset
    At(u64),
    /// No palette: a grey ramp from black to white
    Ramp,
}

/// Everything needed to turn a raw pixel stream into a PNG
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub width: usize,
    pub height: usize,
    pub bits_per_pixel: u32,
    pub encoding: Encoding,
    /// Offset of the pixel stream inside the input
    pub offset: u64,
    pub palette: PaletteSource,
    pub colorspace: NativeColorspace,
}

fn grey_ramp(len: usize) -> Colormap {
    let last = len.saturating_sub(1).max(1);
    (0..len)
        .map(|i| {
            let v = u8::try_from(i * 255 / last).unwrap_or(u8::MAX);
            Color::rgb(v, v, v)
        })
        .collect()
}

#[instrument(skip(file))]
fn load_colormap(
    file: &mut BufReader<File>,
    palette: &PaletteSource,
    colorspace: NativeColorspace,
    max_colors: usize,
) -> Result<Colormap> {
    let native = match palette {
        PaletteSource::List(entries) => entries.clone(),
        PaletteSource::At(offset) => {
            file.seek(SeekFrom::Start(*offset))?;
            ByteReader::new(&mut *file)
                .read_vector::<u8>(max_colors)
                .context("reading palette")?
        }
        PaletteSource::Ramp => return Ok(grey_ramp(max_colors)),
    };
    debug!("Native palette: {native:02x?}");
    ColorConverter::new(ColorLayout::coco3())
        .create_colormap(colorspace, &native)
        .context("converting palette")
}

/// Decodes the pixel stream described by `opts` and writes it as a PNG
///
/// # Errors
///
/// Fails if the input cannot be read, the palette is invalid, the pixel stream is malformed or
/// the output cannot be written
#[instrument]
pub fn decode_to_png(opts: &DecodeOptions) -> Result<()> {
    let layout = PackedPixelLayout::for_bits_per_pixel(opts.bits_per_pixel)?;
    let mut file = BufReader::new(
        File::open(&opts.input).with_context(|| format!("opening {}", opts.input.display()))?,
    );
    let colormap = load_colormap(
        &mut file,
        &opts.palette,
        opts.colorspace,
        layout.max_colors_in_pixel(),
    )?;

    file.seek(SeekFrom::Start(opts.offset))?;
    let source_name = opts
        .input
        .file_name()
        .map_or_else(|| opts.input.display().to_string(), |n| n.to_string_lossy().into_owned());
    let request = DecodeRequest::builder()
        .source_name(source_name)
        .width(opts.width)
        .height(opts.height)
        .layout(layout)
        .encoding(opts.encoding)
        .colormap(&colormap)
        .build();
    let raster = decode_image(&mut ByteReader::new(&mut file), &request)?;

    info!("Writing decoded image to {}", opts.output.display());
    raster.save_png(&opts.output)?;
    info!("Successfully wrote decoded image to {}", opts.output.display());
    Ok(())
}

/// Converts a native palette and formats every entry as `#rrggbbaa`
///
/// # Errors
///
/// Fails if an entry cannot be converted without loss
pub fn describe_palette(native: &[u8], colorspace: NativeColorspace) -> Result<Vec<String>> {
    let colors = ColorConverter::new(ColorLayout::coco3()).convert_colors(colorspace, native)?;
    Ok(colors
        .iter()
        .map(|c| format!("#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a))
        .collect())
}

/// Row pitch in bytes of an image `width` pixels wide
///
/// # Errors
///
/// Fails for unsupported bit depths, a zero width or an invalid alignment
pub fn pitch(bits_per_pixel: u32, width: usize, alignment: usize) -> Result<usize> {
    Ok(PackedPixelLayout::for_bits_per_pixel(bits_per_pixel)?.calculate_pitch(width, alignment)?)
}

/// Default output path: the input's stem with a `png` extension, next to the input
///
/// # Errors
///
/// Fails if the input path has no file name
pub fn default_output(input: &Path) -> Result<PathBuf> {
    input
        .file_name()
        .with_context(|| format!("invalid input file {}", input.display()))?;
    Ok(input.with_extension("png"))
}
