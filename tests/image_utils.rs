use image::{GenericImageView, ImageFormat};
use imagebatch::error::{AcceptError, CropExtractionError, DecodeError, ResizeError};
use imagebatch::image_utils::*;
use tempfile::tempdir;

mod common;
use common::{encode, jpeg_with_orientation, solid_image, write_image};

#[test]
fn to_color_image_matches_input_dimensions() {
    let img = solid_image(3, 5, [10, 20, 30, 255]);
    let color = to_color_image(&img);
    assert_eq!(color.size, [3, 5]);
    assert_eq!(color.pixels.len(), (img.width() * img.height()) as usize);
    assert_eq!(color.pixels[0].r(), 10);
    assert_eq!(color.pixels[0].g(), 20);
    assert_eq!(color.pixels[0].b(), 30);
}

#[test]
fn fit_dimensions_preserves_aspect_and_never_upscales() {
    assert_eq!(fit_dimensions(1200, 900, 600, 600), (600, 450));
    assert_eq!(fit_dimensions(900, 1200, 600, 600), (450, 600));
    assert_eq!(fit_dimensions(300, 200, 600, 600), (300, 200));
    assert_eq!(fit_dimensions(7680, 4320, 3840, 2160), (3840, 2160));
    // Extreme ratios keep at least one pixel.
    assert_eq!(fit_dimensions(10_000, 1, 600, 600), (600, 1));
}

#[test]
fn resize_to_max_bounds_longest_side() {
    let wide = solid_image(1000, 250, [255, 0, 0, 255]);
    let resized = resize_to_max(&wide, 600).unwrap();
    assert_eq!(resized.dimensions(), (600, 150));
    let [r, g, b, a] = resized.to_rgba8().get_pixel(300, 75).0;
    assert!(r >= 250 && g <= 5 && b <= 5 && a >= 250);
}

#[test]
fn resize_to_max_leaves_small_images_alone() {
    let small = solid_image(40, 30, [0, 255, 0, 255]);
    let resized = resize_to_max(&small, 600).unwrap();
    assert_eq!(resized.dimensions(), (40, 30));
}

#[test]
fn resize_to_max_rejects_zero_bound() {
    let img = solid_image(4, 4, [0, 0, 0, 255]);
    assert!(matches!(resize_to_max(&img, 0), Err(ResizeError::ZeroSize)));
}

#[test]
fn crop_region_validation() {
    assert_eq!(CropRegion::new(0, 0, 10, 10).validate(10, 10), Ok(()));
    assert_eq!(
        CropRegion::new(0, 0, 0, 5).validate(10, 10),
        Err(CropExtractionError::Empty)
    );
    assert!(matches!(
        CropRegion::new(5, 0, 6, 5).validate(10, 10),
        Err(CropExtractionError::OutOfBounds { .. })
    ));
    assert!(matches!(
        CropRegion::new(u32::MAX, 0, 2, 2).validate(10, 10),
        Err(CropExtractionError::OutOfBounds { .. })
    ));
}

#[test]
fn crop_and_resize_extracts_the_region() {
    let mut img = solid_image(20, 20, [0, 0, 0, 255]).to_rgba8();
    for y in 10..20 {
        for x in 10..20 {
            img.put_pixel(x, y, image::Rgba([255, 255, 255, 255]));
        }
    }
    let img = image::DynamicImage::ImageRgba8(img);
    let out = crop_and_resize(&img, CropRegion::new(10, 10, 10, 10), 600).unwrap();
    assert_eq!(out.dimensions(), (10, 10));
    assert!(out.to_rgba8().pixels().all(|p| p.0 == [255, 255, 255, 255]));

    let err = crop_and_resize(&img, CropRegion::new(15, 15, 10, 10), 600).unwrap_err();
    assert!(matches!(err, AcceptError::CropExtraction(_)));
}

#[test]
fn decode_source_reads_png_bytes() {
    let img = solid_image(6, 4, [9, 8, 7, 255]);
    let file = SourceFile::from_bytes("tiny.png", Some("image/png".into()), encode(&img, ImageFormat::Png));
    let decoded = decode_source(&file, WORKING_LIMIT).unwrap();
    assert_eq!(decoded.name, "tiny.png");
    assert_eq!(decoded.image.dimensions(), (6, 4));
    assert_eq!(decoded.color_image.size, [6, 4]);
}

#[test]
fn decode_source_uses_jpeg_fast_path() {
    let img = image::DynamicImage::ImageRgb8(solid_image(16, 8, [120, 60, 30, 255]).to_rgb8());
    let file = SourceFile::from_bytes("photo.jpg", None, encode(&img, ImageFormat::Jpeg));
    assert!(file.is_jpeg());
    let decoded = decode_source(&file, WORKING_LIMIT).unwrap();
    assert_eq!(decoded.image.dimensions(), (16, 8));
}

#[test]
fn decode_source_shrinks_to_working_limit() {
    let img = solid_image(400, 100, [1, 1, 1, 255]);
    let file = SourceFile::from_bytes("big.png", None, encode(&img, ImageFormat::Png));
    let decoded = decode_source(&file, (200, 200)).unwrap();
    assert_eq!(decoded.image.dimensions(), (200, 50));
}

#[test]
fn working_limit_applies_to_portrait_images_too() {
    assert_eq!(fit_working_limit(2160, 3840, WORKING_LIMIT), (2160, 3840));
    assert_eq!(fit_working_limit(3840, 2160, WORKING_LIMIT), (3840, 2160));
    assert_eq!(fit_working_limit(4320, 7680, WORKING_LIMIT), (2160, 3840));

    let img = solid_image(20, 40, [1, 1, 1, 255]);
    let file = SourceFile::from_bytes("tall.png", None, encode(&img, ImageFormat::Png));
    assert_eq!(decode_source(&file, (40, 20)).unwrap().image.dimensions(), (20, 40));
}

#[test]
fn decode_source_applies_exif_orientation_on_the_fast_path() {
    let file = SourceFile::from_bytes(
        "phone.jpg",
        Some("image/jpeg".into()),
        jpeg_with_orientation(16, 8, 6),
    );
    assert!(file.is_jpeg());
    let decoded = decode_source(&file, WORKING_LIMIT).unwrap();
    assert_eq!(decoded.image.dimensions(), (8, 16));
}

#[test]
fn decode_source_applies_exif_orientation_without_a_type_hint() {
    let file = SourceFile::from_bytes("phone", None, jpeg_with_orientation(16, 8, 8));
    assert!(!file.is_jpeg());
    let decoded = decode_source(&file, WORKING_LIMIT).unwrap();
    assert_eq!(decoded.image.dimensions(), (8, 16));
}

#[test]
fn decode_source_keeps_upright_jpegs_as_they_are() {
    let file = SourceFile::from_bytes("upright.jpg", None, jpeg_with_orientation(16, 8, 1));
    assert_eq!(decode_source(&file, WORKING_LIMIT).unwrap().image.dimensions(), (16, 8));
}

#[test]
fn decode_source_reports_empty_and_corrupt_data() {
    let empty = SourceFile::from_bytes("empty.png", None, Vec::<u8>::new());
    assert!(matches!(
        decode_source(&empty, WORKING_LIMIT),
        Err(DecodeError::Empty { .. })
    ));

    let corrupt = SourceFile::from_bytes("bad.png", None, b"garbage".to_vec());
    let err = decode_source(&corrupt, WORKING_LIMIT).unwrap_err();
    assert!(matches!(err, DecodeError::Image { .. }));
    assert!(err.to_string().contains("bad.png"));
}

#[test]
fn decode_source_reads_from_path() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("disk.png");
    write_image(&path, &solid_image(5, 5, [3, 3, 3, 255]));

    let file = SourceFile::from_path(&path);
    assert_eq!(file.name, "disk.png");
    assert_eq!(file.mime.as_deref(), Some("image/png"));
    assert_eq!(decode_source(&file, WORKING_LIMIT).unwrap().image.dimensions(), (5, 5));

    let missing = SourceFile::from_path(tmp.path().join("missing.png"));
    assert!(matches!(
        decode_source(&missing, WORKING_LIMIT),
        Err(DecodeError::Read { .. })
    ));
}

#[test]
fn looks_like_image_prefers_mime_over_extension() {
    let by_mime = SourceFile::from_bytes("notes", Some("image/webp".into()), vec![1u8]);
    assert!(by_mime.looks_like_image());
    let wrong_mime = SourceFile::from_bytes("notes.png", Some("text/plain".into()), vec![1u8]);
    assert!(!wrong_mime.looks_like_image());
    let by_extension = SourceFile::from_bytes("scan.TIF", None, vec![1u8]);
    assert!(by_extension.looks_like_image());
    let neither = SourceFile::from_bytes("README", Some(String::new()), vec![1u8]);
    assert!(!neither.looks_like_image());
}

#[test]
fn decoded_images_get_distinct_ids() {
    let a = DecodedImage::new("a", solid_image(1, 1, [0, 0, 0, 255]));
    let b = DecodedImage::new("a", solid_image(1, 1, [0, 0, 0, 255]));
    assert_ne!(a.id, b.id);
}
