//! Shared test utilities for the imgchain test suite.
//!
//! Provides synthetic canvases with known pixel values and helpers that turn
//! them into encoded fixtures.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let storage = MockStorage::with_file(
//!     "/photos/dawn.png",
//!     encode_fixture(&gradient_canvas(64, 48), MimeType::Png),
//! );
//! let handle = ImageHandle::with_backend("/photos/dawn.png", RustCodec::new(), storage).unwrap();
//! ```

use crate::imaging::canvas::{Color, PixelCanvas};
use crate::imaging::{Codec, MimeType, RustCodec};

// =========================================================================
// Canvases
// =========================================================================

/// Opaque canvas where every pixel differs from its neighbours.
pub fn gradient_canvas(width: u32, height: u32) -> PixelCanvas {
    PixelCanvas::from_fn(width, height, |x, y| {
        Color::rgb((x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8)
    })
    .unwrap()
}

/// Canvas filled with a single color.
pub fn solid_canvas(width: u32, height: u32, color: Color) -> PixelCanvas {
    PixelCanvas::filled(width, height, color).unwrap()
}

/// Alternate `a` and `b` on `(x + y) % 2`.
pub fn checkerboard(width: u32, height: u32, a: Color, b: Color) -> PixelCanvas {
    PixelCanvas::from_fn(width, height, |x, y| if (x + y) % 2 == 0 { a } else { b }).unwrap()
}

// =========================================================================
// Encoded fixtures
// =========================================================================

/// Encode `canvas` with default codec settings.
pub fn encode_fixture(canvas: &PixelCanvas, format: MimeType) -> Vec<u8> {
    RustCodec::new().encode(canvas, format).unwrap()
}
