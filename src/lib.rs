//! # imgchain
//!
//! A small image manipulation library with a chainable handle. Load a PNG,
//! GIF or JPEG, apply a sequence of transforms, and save in the original
//! format:
//!
//! ```no_run
//! use imgchain::ImageHandle;
//!
//! # fn main() -> imgchain::imaging::Result<()> {
//! let mut image = ImageHandle::open("content/dawn.jpg")?;
//! image
//!     .fit(1200, 1200)?
//!     .overlay("content/watermark.png", 20, 20)?
//!     .rotate(5.0)?;
//! image.save(Some("dawn-web"))?; // content/dawn-web.jpg
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! bytes ──Codec::decode──▶ PixelCanvas ──transforms──▶ PixelCanvas ──Codec::encode──▶ bytes
//!   ▲                                                                                   │
//!   └──────────────────────────────── Storage ◀─────────────────────────────────────────┘
//! ```
//!
//! Every transform reads the current canvas and produces a new one. The
//! handle swaps the new canvas in only after the transform succeeds.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Canvas, pixel primitives, transform policies, codecs and the [`ImageHandle`] façade |
//! | [`config`] | `imgchain.toml` loading, validation and merging over stock defaults |
//! | [`pipeline`] | Textual op chains (`fit:300x300`, `rotate:90`) used by the CLI |
//!
//! # Design Decisions
//!
//! ## 7-bit Inverted Alpha
//!
//! Canvas alpha runs from 0 (opaque) to 127 (fully transparent), the same
//! scale masks are computed on. Conversion to and from 8-bit RGBA happens
//! only at the codec boundary.
//!
//! ## Pure-Rust Codecs
//!
//! Decoding and encoding use the `image` crate. There are no system
//! dependencies, and the pixel math in [`imaging`] never touches a codec, so
//! it is unit tested on synthetic canvases.

pub mod config;
pub mod imaging;
pub mod pipeline;

pub use imaging::{ImageError, ImageHandle, ImageSource, SaveOutcome};

#[cfg(test)]
pub(crate) mod test_helpers;
