use libcocoimg::{
    decode::{
        decode_count_pairs, decode_escaped, decode_image, decode_packets, decode_pixels,
        decode_raw, unpack, unpack_repeat, DecodeRequest, Encoding, Phase,
    },
    ByteReader, Color, Colormap, Error, PackedPixelLayout, Raster,
};

/// Colormap whose entry `i` is `(i, i, i)`, easy to tell apart in assertions
fn ramp(len: u8) -> Colormap {
    (0..len).map(|i| Color::rgb(i, i, i)).collect()
}

fn c(i: u8) -> Color {
    Color::rgb(i, i, i)
}

fn indices(raster: &Raster) -> Vec<u8> {
    raster.pixels().iter().map(|p| p.r).collect()
}

#[test]
fn raw_bpp4_decodes_high_nibble_first() -> anyhow::Result<()> {
    let data = b"\x01\x23\x45\x67\x89\xab\xcd\xef";
    let colormap = ramp(16);
    let mut raster = Raster::new(8, 1)?;
    let mut reader = ByteReader::new(&data[..]);
    decode_raw(
        &mut reader,
        PackedPixelLayout::bpp4(),
        &colormap,
        &mut raster.cursor(),
    )?;
    assert_eq!(raster.pixels(), &[c(0), c(1), c(2), c(3), c(4), c(5), c(6), c(7)]);
    // only the bytes needed to fill the destination are consumed
    assert_eq!(reader.position(), 4);
    Ok(())
}

#[test]
fn raw_runs_out_of_input() -> anyhow::Result<()> {
    let colormap = ramp(2);
    let mut raster = Raster::new(16, 1)?;
    let result = decode_raw(
        &mut ByteReader::new(&[0xff][..]),
        PackedPixelLayout::bpp1(),
        &colormap,
        &mut raster.cursor(),
    );
    assert!(matches!(result, Err(Error::TruncatedInput { offset: 1, .. })));
    Ok(())
}

#[test]
fn unpack_reports_missing_colors() -> anyhow::Result<()> {
    let colormap = ramp(4);
    let mut raster = Raster::new(2, 1)?;
    let result = unpack(0x15, PackedPixelLayout::bpp4(), &colormap, &mut raster.cursor());
    assert!(matches!(
        result,
        Err(Error::ColorIndexOutOfRange { index: 5, len: 4 })
    ));
    Ok(())
}

#[test]
fn unpack_drops_pixels_past_the_destination() -> anyhow::Result<()> {
    let colormap = ramp(2);
    let mut raster = Raster::new(3, 1)?;
    let mut cursor = raster.cursor();
    unpack(0b1010_1010, PackedPixelLayout::bpp1(), &colormap, &mut cursor)?;
    assert!(cursor.is_full());
    assert!(cursor.write(Color::WHITE).is_err());
    assert_eq!(indices(&raster), vec![1, 0, 1]);
    Ok(())
}

#[test]
fn unpack_repeat_writes_whole_groups() -> anyhow::Result<()> {
    let colormap = ramp(4);
    let mut raster = Raster::new(12, 1)?;
    let mut cursor = raster.cursor();
    unpack_repeat(0b00_01_10_11, 2, PackedPixelLayout::bpp2(), &colormap, &mut cursor)?;
    assert_eq!(cursor.remaining(), 4);
    unpack_repeat(0b11_11_11_11, 0, PackedPixelLayout::bpp2(), &colormap, &mut cursor)?;
    assert_eq!(cursor.position(), 8);
    assert_eq!(indices(&raster)[..8], [0, 1, 2, 3, 0, 1, 2, 3]);
    Ok(())
}

#[test]
fn count_pairs_repeat_count_plus_one() -> anyhow::Result<()> {
    let colormap = ramp(16);
    let mut raster = Raster::new(8, 1)?;
    let mut reader = ByteReader::new(&[0x03, 0x12, 0xff, 0xff][..]);
    decode_count_pairs(
        &mut reader,
        PackedPixelLayout::bpp4(),
        &colormap,
        &mut raster.cursor(),
    )?;
    assert_eq!(indices(&raster), vec![1, 2, 1, 2, 1, 2, 1, 2]);
    assert_eq!(reader.position(), 2);
    Ok(())
}

#[test]
fn count_pairs_across_several_runs() -> anyhow::Result<()> {
    let colormap = ramp(4);
    let mut raster = Raster::new(4, 3)?;
    decode_count_pairs(
        &mut ByteReader::new(&[0x00, 0x1b, 0x01, 0xff][..]),
        PackedPixelLayout::bpp2(),
        &colormap,
        &mut raster.cursor(),
    )?;
    assert_eq!(indices(&raster), vec![0, 1, 2, 3, 3, 3, 3, 3, 3, 3, 3, 3]);
    Ok(())
}

#[test]
fn count_pairs_truncated_mid_pair() -> anyhow::Result<()> {
    let colormap = ramp(16);
    let mut raster = Raster::new(8, 1)?;
    let result = decode_count_pairs(
        &mut ByteReader::new(&[0x00, 0x12, 0x05][..]),
        PackedPixelLayout::bpp4(),
        &colormap,
        &mut raster.cursor(),
    );
    assert!(result.is_err_and(|e| e.is_truncation()));
    Ok(())
}

#[test]
fn escaped_literals_and_runs() -> anyhow::Result<()> {
    let colormap = ramp(16);
    let mut raster = Raster::new(10, 1)?;
    // literal 0x12, run of 3 x 0x34, literal 0x56
    let data = [0x12, 0xc0, 0x03, 0x34, 0x56];
    decode_escaped(
        &mut ByteReader::new(&data[..]),
        0xc0,
        PackedPixelLayout::bpp4(),
        &colormap,
        &mut raster.cursor(),
    )?;
    assert_eq!(indices(&raster), vec![1, 2, 3, 4, 3, 4, 3, 4, 5, 6]);
    Ok(())
}

#[test]
fn escaped_value_is_never_a_literal() -> anyhow::Result<()> {
    let colormap = ramp(16);
    // 0x77 would be a valid literal, but as the escape value it starts a run
    let mut raster = Raster::new(4, 1)?;
    let mut reader = ByteReader::new(&[0x77, 0x02, 0x9a, 0x77][..]);
    decode_escaped(
        &mut reader,
        0x77,
        PackedPixelLayout::bpp4(),
        &colormap,
        &mut raster.cursor(),
    )?;
    assert_eq!(indices(&raster), vec![9, 10, 9, 10]);
    assert_eq!(reader.position(), 3);

    // an escape byte at the very end cannot be read as the final literal
    let mut raster = Raster::new(2, 1)?;
    let result = decode_escaped(
        &mut ByteReader::new(&[0x77][..]),
        0x77,
        PackedPixelLayout::bpp4(),
        &colormap,
        &mut raster.cursor(),
    );
    assert!(matches!(result, Err(Error::TruncatedInput { .. })));
    Ok(())
}

#[test]
fn packets_literal_and_repeat() -> anyhow::Result<()> {
    let colormap = ramp(16);
    // 8 pixels per row at 4 bpp is 4 bytes per row
    let mut raster = Raster::new(8, 2)?;
    let data = [
        // row 0: literal of 2, repeat of 2
        5, 0x02, 0x01, 0x23, 0x82, 0x45,
        // row 1: repeat of 4
        2, 0x84, 0xff,
    ];
    decode_packets(
        &mut ByteReader::new(&data[..]),
        4,
        PackedPixelLayout::bpp4(),
        &colormap,
        &mut raster.cursor(),
    )?;
    assert_eq!(
        indices(&raster),
        vec![0, 1, 2, 3, 4, 5, 4, 5, 15, 15, 15, 15, 15, 15, 15, 15]
    );
    Ok(())
}

#[test]
fn packets_clamp_runs_to_the_row() -> anyhow::Result<()> {
    let colormap = ramp(16);
    let mut raster = Raster::new(4, 2)?;
    let data = [
        // row 0: repeat of 5 clamped to the 2 bytes of the row, trailing packet discarded
        4, 0x85, 0x11, 0x81, 0x22,
        // row 1: literal of 3 clamped to 2, third byte discarded
        4, 0x03, 0x33, 0x44, 0x55,
    ];
    let mut reader = ByteReader::new(&data[..]);
    decode_packets(
        &mut reader,
        2,
        PackedPixelLayout::bpp4(),
        &colormap,
        &mut raster.cursor(),
    )?;
    assert_eq!(indices(&raster), vec![1, 1, 1, 1, 3, 3, 4, 4]);
    assert_eq!(reader.position(), data.len() as u64);
    Ok(())
}

#[test]
fn packets_short_block_continues_in_next_block() -> anyhow::Result<()> {
    let colormap = ramp(2);
    let mut raster = Raster::new(16, 1)?;
    let data = [2, 0x81, 0xff, 2, 0x81, 0x00];
    decode_packets(
        &mut ByteReader::new(&data[..]),
        2,
        PackedPixelLayout::bpp1(),
        &colormap,
        &mut raster.cursor(),
    )?;
    assert_eq!(
        indices(&raster),
        vec![1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0]
    );
    Ok(())
}

#[test]
fn packets_short_block_leaves_only_the_rest_of_the_row() -> anyhow::Result<()> {
    let colormap = ramp(8);
    let mut raster = Raster::new(2, 2)?;
    let data = [
        // row 0: one group, then a block whose repeat of 2 only fits once
        2, 0x81, 5, 2, 0x82, 6,
        // row 1
        2, 0x82, 7,
    ];
    let mut reader = ByteReader::new(&data[..]);
    decode_packets(
        &mut reader,
        2,
        PackedPixelLayout::bpp8(),
        &colormap,
        &mut raster.cursor(),
    )?;
    assert_eq!(indices(&raster), vec![5, 6, 7, 7]);
    assert_eq!(reader.position(), data.len() as u64);
    Ok(())
}

#[test]
fn packets_need_a_row_quota() -> anyhow::Result<()> {
    let colormap = ramp(2);
    let mut raster = Raster::new(8, 1)?;
    let result = decode_packets(
        &mut ByteReader::new(&[1, 0x00][..]),
        0,
        PackedPixelLayout::bpp1(),
        &colormap,
        &mut raster.cursor(),
    );
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    Ok(())
}

#[test]
fn packets_truncated_inside_block() -> anyhow::Result<()> {
    let colormap = ramp(16);
    let mut raster = Raster::new(4, 1)?;
    // the literal packet wants two bytes but the block only holds one
    let result = decode_packets(
        &mut ByteReader::new(&[2, 0x02, 0x11][..]),
        2,
        PackedPixelLayout::bpp4(),
        &colormap,
        &mut raster.cursor(),
    );
    assert!(matches!(result, Err(Error::TruncatedInput { .. })));

    // the block itself is cut short
    let result = decode_packets(
        &mut ByteReader::new(&[4, 0x82][..]),
        2,
        PackedPixelLayout::bpp4(),
        &colormap,
        &mut raster.cursor(),
    );
    assert!(matches!(
        result,
        Err(Error::TruncatedInput {
            offset: 1,
            needed: 4
        })
    ));
    Ok(())
}

#[test]
fn decode_pixels_dispatches_on_encoding() -> anyhow::Result<()> {
    let colormap = ramp(16);
    for (encoding, data) in [
        (Encoding::Raw, vec![0x12, 0x12]),
        (Encoding::CountPairs, vec![0x01, 0x12]),
        (Encoding::Escaped { escape: 0 }, vec![0x00, 0x02, 0x12]),
        (Encoding::Packets { row_bytes: 2 }, vec![2, 0x82, 0x12]),
    ] {
        let mut raster = Raster::new(4, 1)?;
        decode_pixels(
            &mut ByteReader::new(data.as_slice()),
            encoding,
            PackedPixelLayout::bpp4(),
            &colormap,
            &mut raster.cursor(),
        )?;
        assert_eq!(indices(&raster), vec![1, 2, 1, 2], "{encoding}");
    }
    Ok(())
}

#[test]
fn decode_image_names_phase_and_source() -> anyhow::Result<()> {
    let colormap = ramp(16);
    let request = DecodeRequest::builder()
        .source_name("PICTURE.MGE".to_owned())
        .width(4)
        .height(4)
        .layout(PackedPixelLayout::bpp4())
        .encoding(Encoding::CountPairs)
        .colormap(&colormap)
        .build();
    let err = decode_image(&mut ByteReader::new(&[0x00, 0x11][..]), &request).unwrap_err();
    assert!(err.is_truncation());
    assert!(matches!(
        err,
        Error::Decode {
            phase: Phase::Compressed,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "unexpected end of file while processing compressed image data of `PICTURE.MGE`"
    );

    let request = DecodeRequest {
        encoding: Encoding::Raw,
        ..request
    };
    let err = decode_image(&mut ByteReader::new(&[0x00][..]), &request).unwrap_err();
    assert_eq!(
        err.to_string(),
        "unexpected end of file while processing uncompressed image data of `PICTURE.MGE`"
    );

    let raster = decode_image(&mut ByteReader::new(&[0x07, 0x76][..]), &DecodeRequest {
        encoding: Encoding::CountPairs,
        ..request
    })?;
    assert_eq!(raster.pixel(3, 3), Some(c(6)));
    assert_eq!(raster.pixel(4, 0), None);
    Ok(())
}

#[test]
fn decode_image_passes_other_errors_through() -> anyhow::Result<()> {
    let colormap = ramp(2);
    let request = DecodeRequest::builder()
        .source_name("x".to_owned())
        .width(2)
        .height(1)
        .layout(PackedPixelLayout::bpp4())
        .encoding(Encoding::Raw)
        .colormap(&colormap)
        .build();
    let err = decode_image(&mut ByteReader::new(&[0x23][..]), &request).unwrap_err();
    assert!(matches!(err, Error::ColorIndexOutOfRange { index: 2, len: 2 }));

    let request = DecodeRequest { width: 0, ..request };
    let err = decode_image(&mut ByteReader::new(&[0x00][..]), &request).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    Ok(())
}

#[test]
fn decode_image_drops_the_padding_of_every_row() -> anyhow::Result<()> {
    let colormap = ramp(16);
    // 3 pixels at 4 bpp take 2 bytes per row, the fourth nibble is padding
    let request = DecodeRequest::builder()
        .source_name("PADDED".to_owned())
        .width(3)
        .height(2)
        .layout(PackedPixelLayout::bpp4())
        .encoding(Encoding::Raw)
        .colormap(&colormap)
        .build();
    let mut reader = ByteReader::new(&[0x12, 0x30, 0x45, 0x60][..]);
    let raster = decode_image(&mut reader, &request)?;
    assert_eq!(indices(&raster), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(reader.position(), 4);

    // runs cross row boundaries the same way
    let request = DecodeRequest {
        layout: PackedPixelLayout::bpp2(),
        encoding: Encoding::CountPairs,
        ..request
    };
    let raster = decode_image(&mut ByteReader::new(&[0x01, 0x1b][..]), &request)?;
    assert_eq!(indices(&raster), vec![0, 1, 2, 0, 1, 2]);
    Ok(())
}

#[test]
fn row_cursor_counts_padding() -> anyhow::Result<()> {
    let mut raster = Raster::new(3, 2)?;
    assert!(raster.row_cursor(2).is_err());
    let mut cursor = raster.row_cursor(4)?;
    assert_eq!(cursor.remaining(), 8);
    for i in 0..8 {
        cursor.write(c(i))?;
    }
    assert!(cursor.is_full());
    assert!(cursor.write(Color::WHITE).is_err());
    assert_eq!(indices(&raster), vec![0, 1, 2, 4, 5, 6]);
    Ok(())
}
