//! Collaborator traits and shared types.
//!
//! The transform engine only ever sees a [`PixelCanvas`]. Getting bytes in and
//! out goes through two narrow seams:
//!
//! - [`Codec`]: sniff, decode and encode concrete file formats.
//! - [`Storage`]: read and write raw bytes at an opaque locator.
//!
//! The production implementations are
//! [`RustCodec`](super::rust_backend::RustCodec) and
//! [`FsStorage`](super::rust_backend::FsStorage). Tests swap in in-memory
//! doubles without touching the transform code.

use super::canvas::PixelCanvas;
use super::params::MimeType;
use thiserror::Error;

/// Result type for every imaging operation.
pub type Result<T> = std::result::Result<T, ImageError>;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid dimensions {width}x{height}: width and height must be positive")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Canvas {width}x{height} is too large to allocate")]
    CanvasTooLarge { width: u32, height: u32 },
    #[error("Invalid scale factor {0}: must be a positive number")]
    InvalidScale(f64),
    #[error("Invalid rotation angle {0}: must be a finite number")]
    InvalidAngle(f64),
    #[error("Pixel ({x}, {y}) is outside the {width}x{height} canvas")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    #[error("Storage error at {locator}: {source}")]
    Storage {
        locator: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Image canvas has been destroyed; call reset() to reload it")]
    Destroyed,
}

/// Width and height of a canvas or an encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// What a codec can tell about encoded bytes without a full decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    /// MIME tag as reported by the codec, e.g. `image/png`.
    pub mime: String,
    pub width: u32,
    pub height: u32,
}

/// Format codec: turns encoded bytes into canvases and back.
pub trait Codec {
    /// Identify format and dimensions.
    fn sniff(&self, bytes: &[u8]) -> Result<SourceInfo>;

    /// Decode a single frame into a canvas.
    fn decode(&self, bytes: &[u8]) -> Result<PixelCanvas>;

    /// Encode a canvas as `format`.
    fn encode(&self, canvas: &PixelCanvas, format: MimeType) -> Result<Vec<u8>>;
}

/// Byte storage addressed by an opaque locator string.
pub trait Storage {
    fn read(&self, locator: &str) -> Result<Vec<u8>>;

    fn write(&self, locator: &str, bytes: &[u8]) -> Result<()>;
}

impl<T: Codec + ?Sized> Codec for &T {
    fn sniff(&self, bytes: &[u8]) -> Result<SourceInfo> {
        (**self).sniff(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<PixelCanvas> {
        (**self).decode(bytes)
    }

    fn encode(&self, canvas: &PixelCanvas, format: MimeType) -> Result<Vec<u8>> {
        (**self).encode(canvas, format)
    }
}

impl<T: Storage + ?Sized> Storage for &T {
    fn read(&self, locator: &str) -> Result<Vec<u8>> {
        (**self).read(locator)
    }

    fn write(&self, locator: &str, bytes: &[u8]) -> Result<()> {
        (**self).write(locator, bytes)
    }
}
