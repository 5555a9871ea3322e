//! Pure Rust codec and filesystem storage.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Sniff | `image::ImageReader::with_guessed_format` + `into_dimensions` |
//! | Decode (PNG, GIF, JPEG) | `image::ImageReader::decode` → RGBA8 |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (RGBA, adaptive filter) |
//! | Encode → GIF | `image::codecs::gif::GifEncoder` (RGBA, quantized) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (RGB, alpha dropped) |
//! | Read / write | `std::fs` |

use super::backend::{Codec, ImageError, Result, SourceInfo, Storage};
use super::canvas::PixelCanvas;
use super::params::{MimeType, PngCompression, Quality};
use crate::config::ImageConfig;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageReader};
use std::io::Cursor;

/// Codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RustCodec {
    pub jpeg_quality: Quality,
    pub png_compression: PngCompression,
    /// Refuse to decode images with more pixels than this. `None` = no limit.
    pub max_pixels: Option<u64>,
}

impl RustCodec {
    pub fn new() -> Self {
        Self {
            jpeg_quality: Quality::default(),
            png_compression: PngCompression::default(),
            max_pixels: None,
        }
    }

    pub fn from_config(config: &ImageConfig) -> Self {
        Self {
            jpeg_quality: Quality::new(config.encoding.jpeg_quality),
            png_compression: config.encoding.png_compression,
            max_pixels: (config.decoding.max_pixels > 0).then_some(config.decoding.max_pixels),
        }
    }

    fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>> {
        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(format!("Failed to read image header: {e}")))
    }

    fn check_pixel_limit(&self, width: u32, height: u32) -> Result<()> {
        if let Some(max) = self.max_pixels {
            let pixels = u64::from(width) * u64::from(height);
            if pixels > max {
                return Err(ImageError::Decode(format!(
                    "{width}x{height} image has {pixels} pixels, limit is {max}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for RustCodec {
    fn sniff(&self, bytes: &[u8]) -> Result<SourceInfo> {
        let reader = Self::reader(bytes)?;
        let format = reader
            .format()
            .ok_or_else(|| ImageError::Decode("Unrecognized image format".into()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ImageError::Decode(format!("Failed to read dimensions: {e}")))?;
        Ok(SourceInfo {
            mime: format.to_mime_type().to_string(),
            width,
            height,
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<PixelCanvas> {
        let info = self.sniff(bytes)?;
        self.check_pixel_limit(info.width, info.height)?;

        let img = Self::reader(bytes)?
            .decode()
            .map_err(|e| ImageError::Decode(format!("Failed to decode {}: {e}", info.mime)))?;
        let rgba = img.to_rgba8();
        PixelCanvas::from_rgba8(rgba.width(), rgba.height(), rgba.as_raw())
    }

    fn encode(&self, canvas: &PixelCanvas, format: MimeType) -> Result<Vec<u8>> {
        let (width, height) = (canvas.width(), canvas.height());
        let mut buf = Vec::new();

        match format {
            MimeType::Png => {
                let compression = match self.png_compression {
                    PngCompression::Fast => CompressionType::Fast,
                    PngCompression::Default => CompressionType::Default,
                    PngCompression::Best => CompressionType::Best,
                };
                PngEncoder::new_with_quality(&mut buf, compression, PngFilter::Adaptive)
                    .write_image(&canvas.to_rgba8(), width, height, ExtendedColorType::Rgba8)
                    .map_err(|e| ImageError::Encode(format!("PNG encode failed: {e}")))?;
            }
            MimeType::Gif => {
                let mut encoder = GifEncoder::new(&mut buf);
                encoder
                    .encode(&canvas.to_rgba8(), width, height, ExtendedColorType::Rgba8)
                    .map_err(|e| ImageError::Encode(format!("GIF encode failed: {e}")))?;
            }
            MimeType::Jpeg => {
                JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality.value() as u8)
                    .write_image(&canvas.to_rgb8(), width, height, ExtendedColorType::Rgb8)
                    .map_err(|e| ImageError::Encode(format!("JPEG encode failed: {e}")))?;
            }
        }

        Ok(buf)
    }
}

/// Storage on the local filesystem; locators are paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl Storage for FsStorage {
    fn read(&self, locator: &str) -> Result<Vec<u8>> {
        std::fs::read(locator).map_err(|source| ImageError::Storage {
            locator: locator.to_string(),
            source,
        })
    }

    fn write(&self, locator: &str, bytes: &[u8]) -> Result<()> {
        std::fs::write(locator, bytes).map_err(|source| ImageError::Storage {
            locator: locator.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::Dimensions;
    use crate::imaging::canvas::Color;
    use crate::test_helpers::{gradient_canvas, solid_canvas};

    #[test]
    fn png_roundtrip_is_lossless_with_alpha() {
        let codec = RustCodec::new();
        let mut canvas = gradient_canvas(16, 9);
        canvas.set_pixel(3, 3, Color::rgba(1, 2, 3, 64)).unwrap();
        canvas.set_pixel(4, 4, Color::TRANSPARENT).unwrap();

        let bytes = codec.encode(&canvas, MimeType::Png).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(codec.decode(&bytes).unwrap(), canvas);
    }

    #[test]
    fn jpeg_starts_with_soi_marker() {
        let codec = RustCodec::new();
        let bytes = codec
            .encode(&gradient_canvas(20, 10), MimeType::Jpeg)
            .unwrap();
        assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
        let info = codec.sniff(&bytes).unwrap();
        assert_eq!(info.mime, "image/jpeg");
        assert_eq!((info.width, info.height), (20, 10));
    }

    #[test]
    fn jpeg_max_quality_keeps_solid_color_close() {
        let codec = RustCodec::new();
        let bytes = codec
            .encode(&solid_canvas(16, 16, Color::rgb(200, 100, 50)), MimeType::Jpeg)
            .unwrap();
        let decoded = codec.decode(&bytes).unwrap();
        let px = decoded.get_pixel(8, 8).unwrap();
        assert!(px.is_opaque());
        assert!((i32::from(px.red) - 200).abs() <= 3);
        assert!((i32::from(px.green) - 100).abs() <= 3);
        assert!((i32::from(px.blue) - 50).abs() <= 3);
    }

    #[test]
    fn gif_sniffs_as_gif() {
        let codec = RustCodec::new();
        let bytes = codec.encode(&gradient_canvas(8, 6), MimeType::Gif).unwrap();
        assert_eq!(&bytes[..3], b"GIF");
        let info = codec.sniff(&bytes).unwrap();
        assert_eq!(info.mime, "image/gif");
        assert_eq!((info.width, info.height), (8, 6));
        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), Dimensions::from((8, 6)));
    }

    #[test]
    fn garbage_is_decode_error() {
        let codec = RustCodec::new();
        assert!(matches!(
            codec.sniff(b"definitely not an image"),
            Err(ImageError::Decode(_))
        ));
        assert!(matches!(
            codec.decode(b"definitely not an image"),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn pixel_limit_rejects_large_images() {
        let codec = RustCodec {
            max_pixels: Some(10),
            ..RustCodec::new()
        };
        let bytes = RustCodec::new()
            .encode(&gradient_canvas(4, 4), MimeType::Png)
            .unwrap();
        assert!(matches!(codec.decode(&bytes), Err(ImageError::Decode(_))));
    }

    #[test]
    fn from_config_maps_zero_limit_to_none() {
        let config = ImageConfig::default();
        let codec = RustCodec::from_config(&config);
        assert_eq!(codec.jpeg_quality.value(), 100);
        assert_eq!(codec.max_pixels, Some(config.decoding.max_pixels));

        let mut unlimited = ImageConfig::default();
        unlimited.decoding.max_pixels = 0;
        assert_eq!(RustCodec::from_config(&unlimited).max_pixels, None);
    }

    #[test]
    fn fs_storage_roundtrip_and_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("blob.bin");
        let locator = path.to_str().unwrap();

        FsStorage.write(locator, &[7, 8, 9]).unwrap();
        assert_eq!(FsStorage.read(locator).unwrap(), vec![7, 8, 9]);

        let missing = tmp.path().join("nope.bin");
        assert!(matches!(
            FsStorage.read(missing.to_str().unwrap()),
            Err(ImageError::Storage { .. })
        ));
    }
}
