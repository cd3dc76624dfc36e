#![allow(dead_code)]

use std::{io::Cursor, path::PathBuf};

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imagebatch::image_utils::{DecodedImage, SourceFile};

pub fn solid_image(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    let pixel = Rgba(color);
    let buffer = RgbaImage::from_pixel(width, height, pixel);
    DynamicImage::ImageRgba8(buffer)
}

pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, format)
        .expect("failed to encode test image");
    bytes.into_inner()
}

pub fn png_source(name: &str, width: u32, height: u32) -> SourceFile {
    let image = solid_image(width, height, [200, 100, 50, 255]);
    SourceFile::from_bytes(name, Some("image/png".into()), encode(&image, ImageFormat::Png))
}

pub fn corrupt_source(name: &str) -> SourceFile {
    SourceFile::from_bytes(name, Some("image/png".into()), b"definitely not a png".to_vec())
}

pub fn decoded(name: &str, width: u32, height: u32) -> DecodedImage {
    DecodedImage::new(name, solid_image(width, height, [10, 20, 30, 255]))
}

pub fn write_image(path: impl Into<PathBuf>, image: &DynamicImage) {
    image
        .save(path.into())
        .expect("failed to write image to disk");
}

/// JPEG of a `width` x `height` RGB image carrying an EXIF orientation tag.
pub fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(solid_image(width, height, [90, 140, 200, 255]).to_rgb8());
    let jpeg = encode(&image, ImageFormat::Jpeg);

    let mut exif = b"Exif\0\0".to_vec();
    exif.extend_from_slice(b"MM\x00\x2a\x00\x00\x00\x08");
    exif.extend_from_slice(&1u16.to_be_bytes());
    exif.extend_from_slice(&0x0112u16.to_be_bytes());
    exif.extend_from_slice(&3u16.to_be_bytes());
    exif.extend_from_slice(&1u32.to_be_bytes());
    exif.extend_from_slice(&orientation.to_be_bytes());
    exif.extend_from_slice(&[0, 0]);
    exif.extend_from_slice(&0u32.to_be_bytes());

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((exif.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&exif);
    out.extend_from_slice(&jpeg[2..]);
    out
}
