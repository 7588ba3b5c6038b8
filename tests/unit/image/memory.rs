use super::*;

fn ramp(dw: Box2i) -> MemoryImage {
    MemoryImage::from_fn(Format::new(128, 128), dw, &["R"], |_, x, y| {
        (x * 1000 + y) as f32
    })
    .unwrap()
}

#[test]
fn tile_outside_data_window_is_zero() {
    let img = ramp(Box2i::new(Vec2i::new(0, 0), Vec2i::new(9, 9)));
    let tile = img.channel_tile("R", Vec2i::new(64, 64)).unwrap();
    assert_eq!(tile.len(), TILE_PIXELS);
    assert!(tile.iter().all(|v| *v == 0.0));
}

#[test]
fn tile_copies_overlap_at_offset_data_window() {
    let dw = Box2i::new(Vec2i::new(60, -3), Vec2i::new(70, 5));
    let img = ramp(dw);

    let t0 = img.channel_tile("R", Vec2i::new(0, 0)).unwrap();
    // (60, 0) is tile-local (60, 0).
    assert_eq!(t0[60], 60_000.0);
    assert_eq!(t0[(5 * TILE_SIZE + 63) as usize], 63_005.0);
    assert_eq!(t0[(6 * TILE_SIZE + 63) as usize], 0.0);
    assert_eq!(t0[59], 0.0);

    let t1 = img.channel_tile("R", Vec2i::new(64, -64)).unwrap();
    // (70, -1) is tile-local (6, 63).
    assert_eq!(t1[(63 * TILE_SIZE + 6) as usize], 69_999.0);
}

#[test]
fn missing_channel_is_an_evaluation_error() {
    let img = ramp(Box2i::new(Vec2i::new(0, 0), Vec2i::new(1, 1)));
    let err = img.channel_tile("Z", Vec2i::new(0, 0)).unwrap_err();
    assert!(matches!(err, WarpError::Evaluation(_)));
    assert!(img.hash_channel_tile("Z", Vec2i::new(0, 0)).is_err());
}

#[test]
fn rejects_mismatched_and_duplicate_channels() {
    let dw = Box2i::new(Vec2i::new(0, 0), Vec2i::new(1, 1));
    let f = Format::new(2, 2);
    assert!(MemoryImage::new(f, dw, vec![("R".into(), vec![0.0; 3])]).is_err());
    assert!(
        MemoryImage::new(
            f,
            dw,
            vec![("R".into(), vec![0.0; 4]), ("R".into(), vec![0.0; 4])]
        )
        .is_err()
    );
}

#[test]
fn tile_hash_tracks_content_and_origin() {
    let dw = Box2i::new(Vec2i::new(0, 0), Vec2i::new(9, 9));
    let a = ramp(dw);
    let b = MemoryImage::constant(Format::new(128, 128), dw, &["R"], 1.0).unwrap();
    let o = Vec2i::new(0, 0);

    assert_eq!(
        a.hash_channel_tile("R", o).unwrap(),
        a.hash_channel_tile("R", o).unwrap()
    );
    assert_ne!(
        a.hash_channel_tile("R", o).unwrap(),
        b.hash_channel_tile("R", o).unwrap()
    );
    assert_ne!(
        a.hash_channel_tile("R", o).unwrap(),
        a.hash_channel_tile("R", Vec2i::new(64, 0)).unwrap()
    );
}

#[test]
fn rgba8_roundtrip_through_dynamic_image() {
    let mut src = image::RgbaImage::new(3, 2);
    for (x, y, p) in src.enumerate_pixels_mut() {
        p.0 = [(x * 80) as u8, (y * 200) as u8, 7, 255];
    }
    let img = MemoryImage::from_dynamic_image(&image::DynamicImage::ImageRgba8(src.clone())).unwrap();
    assert_eq!(img.channel_names().unwrap().len(), 4);
    assert_eq!(img.to_rgba8().unwrap(), src);
}
