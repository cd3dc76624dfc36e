use fast_image_resize as fr;
use thiserror::Error;

/// A file in a submitted batch could not be turned into a displayable image.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unable to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to decode {name}: {source}")]
    Image {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("{name} is empty")]
    Empty { name: String },
}

impl DecodeError {
    pub fn file_name(&self) -> &str {
        match self {
            Self::Read { name, .. } | Self::Image { name, .. } | Self::Empty { name } => name,
        }
    }
}

/// The crop surface could not produce a region for the active image.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CropExtractionError {
    #[error("crop surface is not initialized")]
    NotInitialized,

    #[error("crop selection is empty")]
    Empty,

    #[error("crop region {x},{y} {width}x{height} exceeds image bounds {image_width}x{image_height}")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },
}

#[derive(Debug, Error)]
pub enum ResizeError {
    #[error("cannot resize an image with zero width or height")]
    ZeroSize,

    #[error("invalid pixel buffer: {0}")]
    Buffer(#[from] fr::ImageBufferError),

    #[error("resize failed: {0}")]
    Resize(#[from] fr::ResizeError),
}

/// Precondition failures of review session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no image is awaiting review")]
    NothingPending,

    #[error("an accept is already in progress")]
    Busy,
}

#[derive(Debug, Error)]
pub enum AcceptError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    CropExtraction(#[from] CropExtractionError),

    #[error(transparent)]
    Resize(#[from] ResizeError),
}
