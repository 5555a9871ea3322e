//! In-memory RGBA canvas.
//!
//! A [`PixelCanvas`] is a fixed-size grid of [`Color`] values. Dimensions never
//! change for the lifetime of a canvas: every transform allocates a new one.
//!
//! ## Alpha convention
//!
//! Alpha is a 7-bit value with an **inverted** scale:
//!
//! | alpha | meaning |
//! |---|---|
//! | `0` | fully opaque |
//! | `127` | fully transparent |
//!
//! The transform math (resampling weights, mask luminance mapping) is written
//! against this scale. Conversion to and from conventional 8-bit RGBA happens
//! only at the codec boundary via [`Color::from_rgba8`] / [`Color::to_rgba8`].

use super::backend::{Dimensions, ImageError, Result};

/// Alpha value of a fully opaque pixel.
pub const ALPHA_OPAQUE: u8 = 0;
/// Alpha value of a fully transparent pixel.
pub const ALPHA_TRANSPARENT: u8 = 127;

/// Largest canvas any constructor or transform will allocate (4 GiB of pixels).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 30;

/// One pixel: 8-bit RGB plus 7-bit inverted alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// `0` = opaque, `127` = transparent.
    pub alpha: u8,
}

impl Color {
    /// Fully transparent black, the fill of every freshly allocated canvas.
    pub const TRANSPARENT: Color = Color {
        red: 0,
        green: 0,
        blue: 0,
        alpha: ALPHA_TRANSPARENT,
    };

    /// Opaque color.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: ALPHA_OPAQUE,
        }
    }

    /// Color with explicit alpha. Values above 127 are clamped.
    pub fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: alpha.min(ALPHA_TRANSPARENT),
        }
    }

    /// Convert from conventional 8-bit RGBA (255 = opaque).
    pub fn from_rgba8([r, g, b, a]: [u8; 4]) -> Self {
        Self {
            red: r,
            green: g,
            blue: b,
            alpha: ALPHA_TRANSPARENT - (a >> 1),
        }
    }

    /// Convert to conventional 8-bit RGBA (255 = opaque).
    ///
    /// `0 → 255` and `127 → 0`; intermediate values spread over the full range
    /// so that `from_rgba8(to_rgba8(c)) == c`.
    pub fn to_rgba8(self) -> [u8; 4] {
        let a = self.alpha.min(ALPHA_TRANSPARENT);
        [
            self.red,
            self.green,
            self.blue,
            255 - ((a << 1) + (a >> 6)),
        ]
    }

    /// Opacity in `0.0..=1.0` (1.0 = opaque).
    pub(crate) fn opacity(self) -> f64 {
        f64::from(ALPHA_TRANSPARENT - self.alpha.min(ALPHA_TRANSPARENT))
            / f64::from(ALPHA_TRANSPARENT)
    }

    pub fn is_opaque(self) -> bool {
        self.alpha == ALPHA_OPAQUE
    }

    pub fn is_transparent(self) -> bool {
        self.alpha >= ALPHA_TRANSPARENT
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// A `width × height` grid of [`Color`] pixels stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl PixelCanvas {
    /// Allocate a canvas filled with fully transparent black.
    ///
    /// Fails with [`ImageError::InvalidDimensions`] when either side is zero.
    pub fn allocate(width: u32, height: u32) -> Result<Self> {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// Allocate a canvas filled with `color`.
    pub fn filled(width: u32, height: u32, color: Color) -> Result<Self> {
        let mut pixels = reserve_pixels(width, height)?;
        pixels.resize(width as usize * height as usize, color);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a canvas by evaluating `f(x, y)` for every coordinate.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Color) -> Result<Self> {
        let mut pixels = reserve_pixels(width, height)?;
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a canvas from a conventional interleaved 8-bit RGBA buffer.
    pub fn from_rgba8(width: u32, height: u32, raw: &[u8]) -> Result<Self> {
        check_canvas_size(width, height)?;
        let expected = width as usize * height as usize * 4;
        if raw.len() != expected {
            return Err(ImageError::Decode(format!(
                "RGBA buffer holds {} bytes, expected {expected} for {width}x{height}",
                raw.len()
            )));
        }
        let pixels = raw
            .chunks_exact(4)
            .map(|px| Color::from_rgba8([px[0], px[1], px[2], px[3]]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Interleaved 8-bit RGBA copy of the canvas (255 = opaque).
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_rgba8()).collect()
    }

    /// Interleaved 8-bit RGB copy of the canvas; alpha is discarded.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| [c.red, c.green, c.blue])
            .collect()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Color> {
        let idx = self.index(x, y)?;
        Ok(self.pixels[idx])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) -> Result<()> {
        let idx = self.index(x, y)?;
        self.pixels[idx] = Color::rgba(color.red, color.green, color.blue, color.alpha);
        Ok(())
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        let color = Color::rgba(color.red, color.green, color.blue, color.alpha);
        self.pixels.fill(color);
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    pub(crate) fn row(&self, y: u32) -> &[Color] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    pub(crate) fn row_mut(&mut self, y: u32) -> &mut [Color] {
        let start = y as usize * self.width as usize;
        let width = self.width as usize;
        &mut self.pixels[start..start + width]
    }

    /// Unchecked read for inner loops that already clipped their coordinates.
    #[inline]
    pub(crate) fn at(&self, x: u32, y: u32) -> Color {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    fn index(&self, x: u32, y: u32) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(ImageError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }
}

pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Positive sides and at most [`MAX_CANVAS_PIXELS`] pixels.
fn check_canvas_size(width: u32, height: u32) -> Result<()> {
    check_dimensions(width, height)?;
    if u64::from(width) * u64::from(height) > MAX_CANVAS_PIXELS {
        return Err(ImageError::CanvasTooLarge { width, height });
    }
    Ok(())
}

/// Empty pixel buffer with exactly `width * height` capacity.
fn reserve_pixels(width: u32, height: u32) -> Result<Vec<Color>> {
    check_canvas_size(width, height)?;
    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(width as usize * height as usize)
        .map_err(|_| ImageError::CanvasTooLarge { width, height })?;
    Ok(pixels)
}
