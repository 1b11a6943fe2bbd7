use super::*;
use crate::test_support::{jpeg, png};

#[test]
fn decode_png_keeps_alpha() {
    let raster = decode_frame("a.png", &png(3, 2, [10, 20, 30, 128])).unwrap();
    assert_eq!(raster.name, "a.png");
    assert_eq!((raster.width(), raster.height()), (3, 2));
    assert_eq!(raster.image.get_pixel(2, 1).0, [10, 20, 30, 128]);
}

#[test]
fn decode_jpeg_gains_opaque_alpha() {
    let raster = decode_frame("a.jpg", &jpeg(8, 8, [200, 100, 50])).unwrap();
    assert_eq!((raster.width(), raster.height()), (8, 8));
    assert!(raster.image.pixels().all(|p| p.0[3] == 255));
}

#[test]
fn decode_ignores_misleading_extension() {
    // pixiv names entries .jpg even when they are not; the format comes from the bytes.
    let raster = decode_frame("000000.jpg", &png(1, 1, [1, 2, 3, 4])).unwrap();
    assert_eq!(raster.image.get_pixel(0, 0).0, [1, 2, 3, 4]);
}

#[test]
fn decode_garbage_is_unsupported_frame() {
    match decode_frame("bad.jpg", b"\x00\x01garbage").unwrap_err() {
        RelayError::UnsupportedFrame(msg) => assert!(msg.contains("bad.jpg"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn decode_truncated_png_fails() {
    let bytes = png(16, 16, [0, 0, 0, 255]);
    assert!(decode_frame("cut.png", &bytes[..bytes.len() / 2]).is_err());
}
