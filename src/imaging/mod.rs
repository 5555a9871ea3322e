//! Image processing: an in-memory canvas plus the transforms that act on it.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Sniff / decode** | `image::ImageReader` (PNG, GIF, JPEG) |
//! | **Encode** | `image` PNG / GIF / JPEG encoders |
//! | **Resample** | area-weighted box filter, rows in parallel via `rayon` |
//! | **Rotate** | exact quarter turns, bilinear inverse mapping otherwise |
//! | **Overlay / crop** | clipped block copy |
//! | **Mask** | alpha from the mask's red channel |
//!
//! The module is split into:
//! - **Canvas**: [`PixelCanvas`] and [`Color`] with 7-bit inverted alpha
//! - **Pixel primitives**: `resample`, `compositor`, `mask`
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Formats, quality and policy enums
//! - **Backend**: [`Codec`] and [`Storage`] traits + [`RustCodec`] / [`FsStorage`]
//! - **Operations**: High-level policies combining calculations + primitives
//! - **Handle**: [`ImageHandle`], the chainable façade over all of the above

pub mod backend;
pub mod calculations;
pub mod canvas;
pub mod compositor;
pub mod handle;
pub mod mask;
pub mod operations;
mod params;
pub mod resample;
pub mod rust_backend;

pub use backend::{Codec, Dimensions, ImageError, Result, SourceInfo, Storage};
pub use canvas::{ALPHA_OPAQUE, ALPHA_TRANSPARENT, Color, MAX_CANVAS_PIXELS, PixelCanvas};
pub use handle::{ImageHandle, ImageSource, SaveOutcome};
pub use params::{FitPolicy, MimeType, PngCompression, Quality};
pub use rust_backend::{FsStorage, RustCodec};
