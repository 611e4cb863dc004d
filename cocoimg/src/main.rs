use cocoimg::{decode_to_png, default_output, describe_palette, pitch, DecodeOptions, PaletteSource};
use std::path::PathBuf;
use tracing::{info, Level};

use anyhow::Result;
use clap::{Parser, Subcommand};
use libcocoimg::{decode::Encoding, parse_byte_list, NativeColorspace};

#[cfg(not(debug_assertions))]
const DEFAULT_DEBUG_LEVEL: u8 = 1;
#[cfg(debug_assertions)]
const DEFAULT_DEBUG_LEVEL: u8 = 99;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Turn debugging information on
    #[arg(short, long, default_value_t = DEFAULT_DEBUG_LEVEL, action = clap::ArgAction::Count)]
    verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// decodes a raw or run-length encoded pixel stream to a PNG image
    Decode {
        /// The file holding the pixel stream
        input: PathBuf,

        /// Image width in pixels
        #[arg(long)]
        width: usize,

        /// Image height in pixels
        #[arg(long)]
        height: usize,

        /// Bits per pixel (1, 2, 4 or 8)
        #[arg(long, default_value_t = 4)]
        bpp: u32,

        /// Pixel stream grammar: raw, pairs, escape:<byte> or packets:<row-bytes>
        #[arg(short, long, default_value = "raw")]
        encoding: Encoding,

        /// Offset of the pixel stream in the input
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Native palette entries, comma separated (e.g. 0,0x3f,$24)
        #[arg(long, conflicts_with = "palette_at")]
        palette: Option<String>,

        /// Read the native palette from the input at this offset
        #[arg(long)]
        palette_at: Option<u64>,

        /// Encoding of the native palette
        #[arg(long, default_value = "rgb")]
        colorspace: NativeColorspace,

        /// The output file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// prints the RGBA colors of a native palette
    Palette {
        /// Native palette entries, comma separated
        entries: String,

        /// Encoding of the native palette
        #[arg(long, default_value = "rgb")]
        colorspace: NativeColorspace,
    },

    /// prints the row pitch in bytes of an image
    Pitch {
        /// Bits per pixel (1, 2, 4 or 8)
        #[arg(long)]
        bpp: u32,

        /// Image width in pixels
        #[arg(long)]
        width: usize,

        /// Row alignment in bytes
        #[arg(long, default_value_t = 1)]
        align: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_file(true)
        .with_line_number(true)
        .init();

    match cli.command {
        Commands::Decode {
            input,
            width,
            height,
            bpp,
            encoding,
            offset,
            palette,
            palette_at,
            colorspace,
            output,
        } => {
            let output = match output {
                Some(o) => o,
                None => {
                    let output = default_output(&input)?;
                    info!("output name: {}", output.display());
                    output
                }
            };
            let palette = match (palette, palette_at) {
                (Some(entries), _) => PaletteSource::List(parse_byte_list(&entries)?),
                (None, Some(offset)) => PaletteSource::At(offset),
                (None, None) => PaletteSource::Ramp,
            };
            decode_to_png(&DecodeOptions {
                input,
                output,
                width,
                height,
                bits_per_pixel: bpp,
                encoding,
                offset,
                palette,
                colorspace,
            })?;
        }
        Commands::Palette {
            entries,
            colorspace,
        } => {
            let entries = parse_byte_list(&entries)?;
            for (i, color) in describe_palette(&entries, colorspace)?.iter().enumerate() {
                println!("{i:3}: {color}");
            }
        }
        Commands::Pitch { bpp, width, align } => {
            println!("{}", pitch(bpp, width, align)?);
        }
    }
    Ok(())
}
