use std::path::Path;

use cocoimg::{decode_to_png, default_output, describe_palette, pitch, DecodeOptions, PaletteSource};
use image::{GenericImageView, ImageReader};
use libcocoimg::{decode::Encoding, NativeColorspace};
use mktemp::Temp;

#[test]
fn decode_stream_with_embedded_palette() -> anyhow::Result<()> {
    // 2 junk bytes, 4-entry native palette at offset 2, pixel stream at offset 6
    let mut file = vec![0xde, 0xad, 0x00, 0x24, 0x12, 0x09];
    file.extend([0x03, 0x1b]);
    let input = Temp::new_file()?;
    std::fs::write(&input, &file)?;
    let output = Temp::new_file()?;

    decode_to_png(&DecodeOptions {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        width: 4,
        height: 4,
        bits_per_pixel: 2,
        encoding: Encoding::CountPairs,
        offset: 6,
        palette: PaletteSource::At(2),
        colorspace: NativeColorspace::Rgb,
    })?;

    let img = ImageReader::open(&output)?.with_guessed_format()?.decode()?;
    assert_eq!(img.dimensions(), (4, 4));
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
    assert_eq!(img.get_pixel(1, 2).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(3, 3).0, [0, 0, 255, 255]);
    Ok(())
}

#[test]
fn truncated_stream_names_the_input() -> anyhow::Result<()> {
    let input = Temp::new_file()?;
    std::fs::write(&input, [0x12, 0x34])?;
    let output = Temp::new_file()?;
    let err = decode_to_png(&DecodeOptions {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        width: 8,
        height: 8,
        bits_per_pixel: 4,
        encoding: Encoding::Raw,
        offset: 0,
        palette: PaletteSource::Ramp,
        colorspace: NativeColorspace::Rgb,
    })
    .unwrap_err();
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    assert_eq!(
        err.to_string(),
        format!("unexpected end of file while processing uncompressed image data of `{name}`")
    );
    Ok(())
}

#[test]
fn palette_descriptions() -> anyhow::Result<()> {
    assert_eq!(
        describe_palette(&[0x00, 0x24, 0x3f], NativeColorspace::Rgb)?,
        vec!["#000000ff", "#ff0000ff", "#ffffffff"]
    );
    assert!(describe_palette(&[0x40], NativeColorspace::Rgb).is_err());
    assert_eq!(describe_palette(&[0, 63], NativeColorspace::Composite)?.len(), 2);
    Ok(())
}

#[test]
fn pitch_and_output_names() -> anyhow::Result<()> {
    assert_eq!(pitch(4, 7, 1)?, 4);
    assert_eq!(pitch(2, 320, 1)?, 80);
    assert!(pitch(3, 320, 1).is_err());
    assert_eq!(
        default_output(Path::new("pics/TITLE.MGE"))?,
        Path::new("pics/TITLE.png")
    );
    assert!(default_output(Path::new("/")).is_err());
    Ok(())
}
