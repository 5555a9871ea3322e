//! Parameter types for encoding.
//!
//! ## Types
//!
//! - [`MimeType`]: The three output formats the handle can save as.
//! - [`Quality`]: Lossy encoding quality (1–100, default 100). Clamped on construction.
//! - [`PngCompression`]: zlib effort for PNG output.
//! - [`FitPolicy`]: How `fit` combines its width and height constraints.

use serde::{Deserialize, Serialize};

/// Encodable image formats, identified by MIME tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MimeType {
    Png,
    Gif,
    Jpeg,
}

impl MimeType {
    /// Parse a MIME tag. `image/jpg` is accepted as an alias of `image/jpeg`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Jpeg => "jpg",
        }
    }
}

impl std::fmt::Display for MimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

/// PNG deflate effort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    #[default]
    Default,
    Best,
}

/// How `fit` derives its scale when both bounds are exceeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitPolicy {
    /// Width check, then height check; the last triggered constraint wins.
    #[default]
    Sequential,
    /// Smallest of the two ratios, so the result always fits both bounds.
    Contain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_maximum() {
        assert_eq!(Quality::default().value(), 100);
    }

    #[test]
    fn mime_parsing() {
        assert_eq!(MimeType::from_mime("image/png"), Some(MimeType::Png));
        assert_eq!(MimeType::from_mime("image/gif"), Some(MimeType::Gif));
        assert_eq!(MimeType::from_mime("image/jpeg"), Some(MimeType::Jpeg));
        assert_eq!(MimeType::from_mime("image/jpg"), Some(MimeType::Jpeg));
        assert_eq!(MimeType::from_mime("IMAGE/PNG"), Some(MimeType::Png));
        assert_eq!(MimeType::from_mime("image/webp"), None);
    }

    #[test]
    fn mime_roundtrips_through_str() {
        for mime in [MimeType::Png, MimeType::Gif, MimeType::Jpeg] {
            assert_eq!(MimeType::from_mime(mime.as_str()), Some(mime));
        }
    }

    #[test]
    fn png_compression_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            level: PngCompression,
        }
        let w: Wrapper = toml::from_str(r#"level = "best""#).unwrap();
        assert_eq!(w.level, PngCompression::Best);
    }
}
