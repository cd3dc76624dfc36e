use std::{
    borrow::Cow,
    fmt,
    io::Cursor,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use eframe::egui;
use fast_image_resize as fr;
use image::{metadata::Orientation, DynamicImage, ImageDecoder, ImageReader, RgbaImage};
use tracing::debug;
use zune_jpeg::JpegDecoder;

use crate::{
    error::{AcceptError, CropExtractionError, DecodeError, ResizeError},
    fs_utils::is_supported_image,
};

/// Longest side of an accepted image.
pub const DEFAULT_MAX_DIMENSION: u32 = 600;

/// Decoded images larger than this are scaled down before review, as
/// `(longest side, shortest side)` so portrait and landscape 4K both fit.
pub const WORKING_LIMIT: (u32, u32) = (3840, 2160);

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

fn next_image_id() -> u64 {
    NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub enum SourceData {
    Bytes(Arc<[u8]>),
    /// Read lazily at decode time so that read failures fail the batch like decode failures.
    Path(PathBuf),
}

/// One user-selected image as delivered by the drop surface or the command line.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub mime: Option<String>,
    pub data: SourceData,
}

impl SourceFile {
    pub fn from_bytes(
        name: impl Into<String>,
        mime: Option<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime: mime.filter(|m| !m.is_empty()),
            data: SourceData::Bytes(bytes.into()),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            mime: guess_mime(&path),
            data: SourceData::Path(path),
        }
    }

    pub fn read_bytes(&self) -> Result<Cow<'_, [u8]>, DecodeError> {
        match &self.data {
            SourceData::Bytes(bytes) => Ok(Cow::Borrowed(bytes.as_ref())),
            SourceData::Path(path) => std::fs::read(path)
                .map(Cow::Owned)
                .map_err(|source| DecodeError::Read {
                    name: self.name.clone(),
                    source,
                }),
        }
    }

    pub fn is_jpeg(&self) -> bool {
        match self.mime.as_deref() {
            Some(mime) => mime.eq_ignore_ascii_case("image/jpeg"),
            None => Path::new(&self.name)
                .extension()
                .and_then(|e| e.to_str())
                .map(|s| s.eq_ignore_ascii_case("jpg") || s.eq_ignore_ascii_case("jpeg"))
                .unwrap_or(false),
        }
    }

    /// Advisory `image/*` filter. Files without a MIME type fall back to the extension.
    pub fn looks_like_image(&self) -> bool {
        match self.mime.as_deref() {
            Some(mime) => mime.to_ascii_lowercase().starts_with("image/"),
            None => is_supported_image(Path::new(&self.name)),
        }
    }
}

fn guess_mime(path: &Path) -> Option<String> {
    image::ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

/// A source file decoded and ready to be shown on the crop surface.
#[derive(Clone)]
pub struct DecodedImage {
    pub id: u64,
    pub name: String,
    pub image: Arc<DynamicImage>,
    pub color_image: egui::ColorImage,
}

impl DecodedImage {
    pub fn new(name: impl Into<String>, image: DynamicImage) -> Self {
        let color_image = to_color_image(&image);
        Self {
            id: next_image_id(),
            name: name.into(),
            image: Arc::new(image),
            color_image,
        }
    }

    pub fn size(&self) -> egui::Vec2 {
        egui::vec2(self.image.width() as f32, self.image.height() as f32)
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}

/// A cropped and resized image owned by the gallery.
#[derive(Clone)]
pub struct ProcessedImage {
    pub id: u64,
    pub source_name: String,
    pub image: DynamicImage,
    pub color_image: egui::ColorImage,
}

impl ProcessedImage {
    pub fn new(source_name: impl Into<String>, image: DynamicImage) -> Self {
        let color_image = to_color_image(&image);
        Self {
            id: next_image_id(),
            source_name: source_name.into(),
            image,
            color_image,
        }
    }
}

impl fmt::Debug for ProcessedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessedImage")
            .field("id", &self.id)
            .field("source_name", &self.source_name)
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}

/// Rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full(image: &DynamicImage) -> Self {
        Self::new(0, 0, image.width(), image.height())
    }

    pub fn validate(&self, image_width: u32, image_height: u32) -> Result<(), CropExtractionError> {
        if self.width == 0 || self.height == 0 {
            return Err(CropExtractionError::Empty);
        }
        let fits_x = self
            .x
            .checked_add(self.width)
            .is_some_and(|right| right <= image_width);
        let fits_y = self
            .y
            .checked_add(self.height)
            .is_some_and(|bottom| bottom <= image_height);
        if !fits_x || !fits_y {
            return Err(CropExtractionError::OutOfBounds {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                image_width,
                image_height,
            });
        }
        Ok(())
    }
}

pub fn to_color_image(img: &DynamicImage) -> egui::ColorImage {
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let pixels = rgba.into_raw();
    egui::ColorImage::from_rgba_unmultiplied(size, &pixels)
}

/// Largest size with the same aspect ratio that fits within `max_width` x `max_height`.
/// Never scales up.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let new_w = ((width as f64 * scale).round() as u32).clamp(1, max_width.max(1));
    let new_h = ((height as f64 * scale).round() as u32).clamp(1, max_height.max(1));
    (new_w, new_h)
}

/// Like [`fit_dimensions`], with `limit` given as `(longest, shortest)` and
/// turned to match the orientation of the image.
pub fn fit_working_limit(width: u32, height: u32, limit: (u32, u32)) -> (u32, u32) {
    let (long, short) = (limit.0.max(limit.1), limit.0.min(limit.1));
    if width >= height {
        fit_dimensions(width, height, long, short)
    } else {
        fit_dimensions(width, height, short, long)
    }
}

pub fn resize_rgba(image: &DynamicImage, width: u32, height: u32) -> Result<RgbaImage, ResizeError> {
    if width == 0 || height == 0 || image.width() == 0 || image.height() == 0 {
        return Err(ResizeError::ZeroSize);
    }
    let rgba = image.to_rgba8();
    let (src_w, src_h) = rgba.dimensions();
    let src_image = fr::images::Image::from_vec_u8(src_w, src_h, rgba.into_raw(), fr::PixelType::U8x4)?;
    let mut dst_image = fr::images::Image::new(width, height, fr::PixelType::U8x4);
    let mut resizer = fr::Resizer::new();
    resizer.resize(&src_image, &mut dst_image, &fr::ResizeOptions::default())?;
    RgbaImage::from_raw(width, height, dst_image.into_vec())
        .ok_or(ResizeError::Buffer(fr::ImageBufferError::InvalidBufferSize))
}

/// Scale `image` down so that its longest side is at most `max_dimension`.
pub fn resize_to_max(image: &DynamicImage, max_dimension: u32) -> Result<DynamicImage, ResizeError> {
    if max_dimension == 0 || image.width() == 0 || image.height() == 0 {
        return Err(ResizeError::ZeroSize);
    }
    let (width, height) = fit_dimensions(image.width(), image.height(), max_dimension, max_dimension);
    if (width, height) == (image.width(), image.height()) {
        return Ok(DynamicImage::ImageRgba8(image.to_rgba8()));
    }
    resize_rgba(image, width, height).map(DynamicImage::ImageRgba8)
}

pub fn crop_and_resize(
    image: &DynamicImage,
    region: CropRegion,
    max_dimension: u32,
) -> Result<DynamicImage, AcceptError> {
    region.validate(image.width(), image.height())?;
    let cropped = image.crop_imm(region.x, region.y, region.width, region.height);
    Ok(resize_to_max(&cropped, max_dimension)?)
}

fn decode_jpeg(bytes: &[u8]) -> Option<DynamicImage> {
    let mut decoder = JpegDecoder::new(Cursor::new(bytes));
    let pixels = decoder.decode().ok()?;
    let info = decoder.info()?;
    let (width, height) = (info.width as u32, info.height as u32);
    // Only trust the fast path for RGB output; anything else goes through `image`.
    if pixels.len() != width as usize * height as usize * 3 {
        return None;
    }
    let mut image = image::RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)?;
    if let Some(orientation) = decoder.exif().and_then(|exif| Orientation::from_exif_chunk(exif)) {
        image.apply_orientation(orientation);
    }
    Some(image)
}

/// Decode with `image`, turning the result upright according to its EXIF orientation.
fn decode_with_image(bytes: &[u8]) -> image::ImageResult<DynamicImage> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    Ok(image)
}

/// Read and decode one source file, upright per its EXIF orientation and
/// shrunk to `working_limit` if it is larger.
pub fn decode_source(file: &SourceFile, working_limit: (u32, u32)) -> Result<DecodedImage, DecodeError> {
    let start = Instant::now();
    let bytes = file.read_bytes()?;
    let read_duration = start.elapsed();
    if bytes.is_empty() {
        return Err(DecodeError::Empty {
            name: file.name.clone(),
        });
    }

    let decode_start = Instant::now();
    let fast = if file.is_jpeg() { decode_jpeg(&bytes) } else { None };
    let mut image = match fast {
        Some(image) => image,
        None => decode_with_image(&bytes).map_err(|source| DecodeError::Image {
            name: file.name.clone(),
            source,
        })?,
    };
    let decode_duration = decode_start.elapsed();
    drop(bytes);

    let resize_start = Instant::now();
    let (new_w, new_h) = fit_working_limit(image.width(), image.height(), working_limit);
    if (new_w, new_h) != (image.width(), image.height()) {
        match resize_rgba(&image, new_w, new_h) {
            Ok(resized) => image = DynamicImage::ImageRgba8(resized),
            Err(err) => debug!(name = %file.name, "keeping full-size image: {err}"),
        }
    }
    let resize_duration = resize_start.elapsed();

    debug!(
        name = %file.name,
        width = image.width(),
        height = image.height(),
        ?read_duration,
        ?decode_duration,
        ?resize_duration,
        total = ?start.elapsed(),
        "decoded source file"
    );
    Ok(DecodedImage::new(file.name.clone(), image))
}
