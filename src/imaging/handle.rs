//! The chainable image handle.
//!
//! An [`ImageHandle`] remembers where its image came from, owns exactly one
//! current canvas, and replaces that canvas on every transform:
//!
//! ```text
//! open ──reset──▶ Loaded ──resize/crop/rotate/…──▶ Loaded
//!                   │                               │
//!                   └────────────destroy────────────┴──▶ Destroyed ──reset──▶ Loaded
//! ```
//!
//! Each transform computes its new canvas in full before the old one is
//! dropped, so a failing transform leaves the handle exactly as it was.
//!
//! A handle is not internally synchronized. Share it across threads only
//! behind the caller's own lock.
//!
//! ```no_run
//! use imgchain::ImageHandle;
//!
//! # fn main() -> imgchain::imaging::Result<()> {
//! let mut image = ImageHandle::open("/photos/dawn.jpg")?;
//! image.fill(300, 300)?.rotate(90.0)?;
//! image.save(Some("dawn-square"))?; // → /photos/dawn-square.jpg
//! # Ok(())
//! # }
//! ```

use super::backend::{Codec, Dimensions, ImageError, Result, Storage};
use super::canvas::PixelCanvas;
use super::compositor;
use super::mask::apply_mask;
use super::operations;
use super::params::{FitPolicy, MimeType};
use super::rust_backend::{FsStorage, RustCodec};
use crate::config::ImageConfig;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Where an overlay or mask comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Encoded image read through the handle's storage.
    Locator(String),
    /// Already-decoded pixels, used as is.
    Canvas(PixelCanvas),
}

impl ImageSource {
    /// Snapshot another handle the way it would export: encoded to PNG and
    /// decoded again.
    pub fn from_handle<C: Codec, S: Storage>(handle: &ImageHandle<C, S>) -> Result<Self> {
        let bytes = handle.to_png_bytes()?;
        Ok(Self::Canvas(handle.codec.decode(&bytes)?))
    }
}

impl From<&str> for ImageSource {
    fn from(locator: &str) -> Self {
        Self::Locator(locator.to_string())
    }
}

impl From<String> for ImageSource {
    fn from(locator: String) -> Self {
        Self::Locator(locator)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        Self::Locator(path.to_string_lossy().into_owned())
    }
}

impl From<PixelCanvas> for ImageSource {
    fn from(canvas: PixelCanvas) -> Self {
        Self::Canvas(canvas)
    }
}

/// What [`ImageHandle::save`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written through storage at this resolved locator.
    Written(String),
    /// No location given: the encoded bytes.
    Bytes(Vec<u8>),
}

/// A loaded image plus the chain of transforms applied to it.
pub struct ImageHandle<C: Codec = RustCodec, S: Storage = FsStorage> {
    locator: String,
    mime: String,
    width: u32,
    height: u32,
    canvas: Option<PixelCanvas>,
    codec: C,
    storage: S,
    fit_policy: FitPolicy,
}

impl ImageHandle {
    /// Load an image from the filesystem with default settings.
    pub fn open(locator: impl Into<String>) -> Result<Self> {
        Self::open_with_config(locator, &ImageConfig::default())
    }

    /// Load an image from the filesystem, taking codec settings and the fit
    /// policy from `config`.
    pub fn open_with_config(locator: impl Into<String>, config: &ImageConfig) -> Result<Self> {
        let mut handle = Self::with_backend(locator, RustCodec::from_config(config), FsStorage)?;
        handle.fit_policy = config.transform.fit_policy;
        Ok(handle)
    }
}

impl<C: Codec, S: Storage> ImageHandle<C, S> {
    /// Load an image through the given codec and storage.
    pub fn with_backend(locator: impl Into<String>, codec: C, storage: S) -> Result<Self> {
        let mut handle = Self {
            locator: locator.into(),
            mime: String::new(),
            width: 0,
            height: 0,
            canvas: None,
            codec,
            storage,
            fit_policy: FitPolicy::default(),
        };
        handle.reset()?;
        Ok(handle)
    }

    /// Use `policy` for subsequent [`fit`](Self::fit) calls.
    pub fn with_fit_policy(mut self, policy: FitPolicy) -> Self {
        self.fit_policy = policy;
        self
    }

    /// MIME type of the original source, e.g. `image/png`.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Width and height of the current canvas.
    ///
    /// After [`destroy`](Self::destroy) this is the last known size, until the
    /// next [`reset`](Self::reset) reloads the original.
    pub fn size(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Locator the handle was opened from.
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// The current canvas, or `None` after [`destroy`](Self::destroy).
    pub fn canvas(&self) -> Option<&PixelCanvas> {
        self.canvas.as_ref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.canvas.is_none()
    }

    /// Reload from the original source, discarding every transform.
    ///
    /// The freshly decoded canvas is passed through a 100% resample so that
    /// transparency is represented the same way as after any other transform.
    pub fn reset(&mut self) -> Result<&mut Self> {
        let bytes = self.storage.read(&self.locator)?;
        let info = self.codec.sniff(&bytes)?;
        let decoded = self.codec.decode(&bytes)?;
        let normalized = operations::percent(&decoded, 1.0)?;

        log::info!(
            "loaded {} ({}, {}x{})",
            self.locator,
            info.mime,
            normalized.width(),
            normalized.height()
        );
        self.mime = info.mime;
        self.replace(normalized);
        Ok(self)
    }

    /// Release the current canvas. Calling it again is a no-op.
    ///
    /// [`mime`](Self::mime) and [`size`](Self::size) keep reporting the values
    /// from before the release.
    pub fn destroy(&mut self) -> &mut Self {
        if self.canvas.take().is_some() {
            log::debug!("destroyed canvas of {}", self.locator);
        }
        self
    }

    /// Resample to exactly `width × height`.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<&mut Self> {
        let out = operations::resize(self.current()?, width, height)?;
        self.replace(out);
        Ok(self)
    }

    /// Reframe to `width × height` with the window origin at `(x, y)`.
    pub fn crop(&mut self, width: u32, height: u32, x: i64, y: i64) -> Result<&mut Self> {
        let out = operations::crop(self.current()?, width, height, x, y)?;
        self.replace(out);
        Ok(self)
    }

    /// Rotate counter-clockwise by `angle` degrees, growing the canvas to fit.
    pub fn rotate(&mut self, angle: f64) -> Result<&mut Self> {
        let out = compositor::rotate(self.current()?, angle)?;
        log::debug!(
            "rotate {angle}° -> {}x{}",
            out.width(),
            out.height()
        );
        self.replace(out);
        Ok(self)
    }

    /// Paste `source` over the current canvas with its top-left at `(x, y)`.
    pub fn overlay(&mut self, source: impl Into<ImageSource>, x: i64, y: i64) -> Result<&mut Self> {
        let current = self.current()?;
        let overlay = self.resolve_source(source.into())?;
        let mut out = current.clone();
        compositor::copy_into(&mut out, &overlay, x, y);
        log::debug!(
            "overlay {}x{} at ({x}, {y})",
            overlay.width(),
            overlay.height()
        );
        self.replace(out);
        Ok(self)
    }

    /// Crop to the mask's size at `(x, y)` and take alpha from its red channel.
    pub fn mask(&mut self, source: impl Into<ImageSource>, x: i64, y: i64) -> Result<&mut Self> {
        let current = self.current()?;
        let mask = self.resolve_source(source.into())?;
        let out = apply_mask(current, &mask, x, y)?;
        self.replace(out);
        Ok(self)
    }

    /// Scale both sides by `factor` (1.0 = 100%).
    pub fn percent(&mut self, factor: f64) -> Result<&mut Self> {
        let out = operations::percent(self.current()?, factor)?;
        self.replace(out);
        Ok(self)
    }

    /// Downscale to fit within `width × height`.
    pub fn fit(&mut self, width: u32, height: u32) -> Result<&mut Self> {
        let policy = self.fit_policy;
        if let Cow::Owned(out) = operations::fit(self.current()?, width, height, policy)? {
            self.replace(out);
        }
        Ok(self)
    }

    /// Scale to cover `width × height` and center-crop the overflow.
    pub fn fill(&mut self, width: u32, height: u32) -> Result<&mut Self> {
        if let Cow::Owned(out) = operations::fill(self.current()?, width, height)? {
            self.replace(out);
        }
        Ok(self)
    }

    /// Encode in the original format.
    ///
    /// With `None`, returns the encoded bytes. With a location, writes there
    /// and returns the resolved locator; a bare name without any `/` is placed
    /// beside the original and given its extension (see
    /// [`resolve_save_locator`]).
    pub fn save(&self, location: Option<&str>) -> Result<SaveOutcome> {
        let format = MimeType::from_mime(&self.mime)
            .ok_or_else(|| ImageError::UnsupportedFormat(self.mime.clone()))?;
        let bytes = self.codec.encode(self.current()?, format)?;

        match location.filter(|l| !l.is_empty()) {
            None => Ok(SaveOutcome::Bytes(bytes)),
            Some(location) => {
                let target = resolve_save_locator(&self.locator, location, format);
                self.storage.write(&target, &bytes)?;
                log::info!("saved {} ({format}, {} bytes)", target, bytes.len());
                Ok(SaveOutcome::Written(target))
            }
        }
    }

    /// The current canvas encoded as PNG, whatever the original format.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        self.codec.encode(self.current()?, MimeType::Png)
    }

    fn current(&self) -> Result<&PixelCanvas> {
        self.canvas.as_ref().ok_or(ImageError::Destroyed)
    }

    fn replace(&mut self, canvas: PixelCanvas) {
        self.width = canvas.width();
        self.height = canvas.height();
        self.canvas = Some(canvas);
    }

    fn resolve_source(&self, source: ImageSource) -> Result<PixelCanvas> {
        match source {
            ImageSource::Canvas(canvas) => Ok(canvas),
            ImageSource::Locator(locator) => {
                let bytes = self.storage.read(&locator)?;
                self.codec.decode(&bytes)
            }
        }
    }
}

impl<C: Codec, S: Storage> TryFrom<&ImageHandle<C, S>> for Vec<u8> {
    type Error = ImageError;

    fn try_from(handle: &ImageHandle<C, S>) -> Result<Self> {
        handle.to_png_bytes()
    }
}

impl<C: Codec, S: Storage> std::fmt::Debug for ImageHandle<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandle")
            .field("locator", &self.locator)
            .field("mime", &self.mime)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

/// Expand a save location that contains no `/`.
///
/// `"thumb"` next to `/photos/dawn.jpg` becomes `/photos/thumb.jpg`. A
/// location with a `/` anywhere is used verbatim. When the original has no
/// extension, the canonical one for `format` is used.
pub fn resolve_save_locator(original: &str, location: &str, format: MimeType) -> String {
    if location.contains('/') {
        return location.to_string();
    }

    let original = Path::new(original);
    let extension = original
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_else(|| format.extension());
    let dir = match original.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let dir = dir.to_string_lossy();
    format!("{}/{location}.{extension}", dir.trim_end_matches('/'))
}
