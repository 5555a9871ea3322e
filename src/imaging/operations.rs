//! High-level transform policies.
//!
//! These functions combine [`calculations`](super::calculations) with the
//! pixel primitives in [`resample`](super::resample) and
//! [`compositor`](super::compositor). None of them mutate their input: each
//! returns a new canvas, or borrows the input back when the policy decides
//! nothing needs to change.

use super::backend::Result;
use super::calculations::{centered_crop_offset, fill_plan, fit_scale_with, percent_dimensions};
use super::canvas::{PixelCanvas, check_dimensions};
use super::compositor::copy_into;
use super::params::FitPolicy;
use super::resample::resample;
use std::borrow::Cow;

/// Resize to exactly `width × height`, ignoring aspect ratio.
pub fn resize(canvas: &PixelCanvas, width: u32, height: u32) -> Result<PixelCanvas> {
    let out = resample(canvas, width, height)?;
    log::debug!(
        "resize {}x{} -> {width}x{height}",
        canvas.width(),
        canvas.height()
    );
    Ok(out)
}

/// Scale both sides by `factor`.
///
/// Always resamples, even for a factor of 1: the result is a fresh canvas
/// with normalized transparency.
pub fn percent(canvas: &PixelCanvas, factor: f64) -> Result<PixelCanvas> {
    let target = percent_dimensions(canvas.dimensions(), factor)?;
    log::debug!(
        "percent {factor} on {}x{} -> {}x{}",
        canvas.width(),
        canvas.height(),
        target.width,
        target.height
    );
    resample(canvas, target.width, target.height)
}

/// Uniformly downscale so the canvas fits `max_width × max_height`.
///
/// Returns the input unchanged when no scaling is needed. See
/// [`FitPolicy`] for how the two bounds combine.
pub fn fit(
    canvas: &PixelCanvas,
    max_width: u32,
    max_height: u32,
    policy: FitPolicy,
) -> Result<Cow<'_, PixelCanvas>> {
    check_dimensions(max_width, max_height)?;
    let scale = fit_scale_with(policy, canvas.dimensions(), max_width, max_height);
    if scale == 1.0 {
        return Ok(Cow::Borrowed(canvas));
    }

    let out = percent(canvas, scale)?;
    if out.width() > max_width || out.height() > max_height {
        log::warn!(
            "fit {max_width}x{max_height}: {:?} policy produced {}x{}, which exceeds the bounds",
            policy,
            out.width(),
            out.height()
        );
    }
    Ok(Cow::Owned(out))
}

/// Scale to cover `width × height`, then center-crop the overflow.
pub fn fill(canvas: &PixelCanvas, width: u32, height: u32) -> Result<Cow<'_, PixelCanvas>> {
    check_dimensions(width, height)?;
    let target = (width, height).into();
    let plan = fill_plan(canvas.dimensions(), target);

    let scaled = if plan.scale != 1.0 {
        Cow::Owned(percent(canvas, plan.scale)?)
    } else {
        Cow::Borrowed(canvas)
    };

    if !plan.needs_crop {
        return Ok(scaled);
    }

    let (x, y) = centered_crop_offset(scaled.dimensions(), target);
    log::debug!(
        "fill {width}x{height}: scaled to {}x{}, crop offset ({x}, {y})",
        scaled.width(),
        scaled.height()
    );
    Ok(Cow::Owned(crop(&scaled, width, height, x, y)?))
}

/// Reframe into a new `width × height` canvas.
///
/// The source origin lands at `(-x, -y)`: positive offsets move the window
/// right/down into the image, negative offsets add a transparent margin on the
/// top/left. Regions of the window not covered by the source stay transparent.
pub fn crop(canvas: &PixelCanvas, width: u32, height: u32, x: i64, y: i64) -> Result<PixelCanvas> {
    let mut out = PixelCanvas::allocate(width, height)?;
    copy_into(&mut out, canvas, x.saturating_neg(), y.saturating_neg());
    log::debug!(
        "crop {}x{} -> {width}x{height} at ({x}, {y})",
        canvas.width(),
        canvas.height()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::ImageError;
    use crate::imaging::canvas::Color;
    use crate::test_helpers::{gradient_canvas, solid_canvas};

    // =========================================================================
    // percent
    // =========================================================================

    #[test]
    fn percent_one_keeps_size_and_content() {
        let src = gradient_canvas(12, 8);
        let out = percent(&src, 1.0).unwrap();
        assert_eq!(out.dimensions(), src.dimensions());
        assert_eq!(out, src);
    }

    #[test]
    fn percent_halves() {
        let src = gradient_canvas(1024, 768);
        let out = percent(&src, 0.1).unwrap();
        assert_eq!((out.width(), out.height()), (102, 77));
    }

    #[test]
    fn percent_rejects_zero() {
        let src = gradient_canvas(4, 4);
        assert!(matches!(percent(&src, 0.0), Err(ImageError::InvalidScale(_))));
    }

    // =========================================================================
    // fit
    // =========================================================================

    #[test]
    fn fit_small_image_is_borrowed() {
        let src = gradient_canvas(100, 50);
        let out = fit(&src, 300, 300, FitPolicy::Sequential).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn fit_sequential_height_wins() {
        let src = gradient_canvas(1024, 768);
        let out = fit(&src, 300, 300, FitPolicy::Sequential).unwrap();
        assert_eq!((out.width(), out.height()), (400, 300));
    }

    #[test]
    fn fit_contain_fits_both_bounds() {
        let src = gradient_canvas(1024, 768);
        let out = fit(&src, 300, 300, FitPolicy::Contain).unwrap();
        assert_eq!((out.width(), out.height()), (300, 225));
    }

    #[test]
    fn fit_width_only_overflow() {
        let src = gradient_canvas(600, 100);
        let out = fit(&src, 300, 300, FitPolicy::Sequential).unwrap();
        assert_eq!((out.width(), out.height()), (300, 50));
    }

    #[test]
    fn fit_zero_bounds_are_invalid() {
        let src = gradient_canvas(10, 10);
        assert!(matches!(
            fit(&src, 0, 10, FitPolicy::Sequential),
            Err(ImageError::InvalidDimensions { .. })
        ));
    }

    // =========================================================================
    // fill
    // =========================================================================

    #[test]
    fn fill_landscape_into_square_centers_crop() {
        // 1024x768 → scale 300/768 → 400x300 → crop 50px off each side.
        let src = PixelCanvas::from_fn(1024, 768, |x, _| {
            if x < 128 || x >= 896 {
                Color::rgb(255, 0, 0)
            } else {
                Color::rgb(0, 0, 255)
            }
        })
        .unwrap();
        let out = fill(&src, 300, 300).unwrap();
        assert_eq!((out.width(), out.height()), (300, 300));
        // The red bands (50px wide after scaling) were cropped away on both sides.
        assert_eq!(out.get_pixel(0, 150).unwrap(), Color::rgb(0, 0, 255));
        assert_eq!(out.get_pixel(299, 150).unwrap(), Color::rgb(0, 0, 255));
        assert!(out.pixels().iter().all(|c| c.is_opaque()));
    }

    #[test]
    fn fill_portrait_into_landscape() {
        let src = gradient_canvas(300, 600);
        let out = fill(&src, 200, 100).unwrap();
        assert_eq!((out.width(), out.height()), (200, 100));
        assert!(out.pixels().iter().all(|c| c.is_opaque()));
    }

    #[test]
    fn fill_same_ratio_only_scales() {
        let src = gradient_canvas(800, 600);
        let out = fill(&src, 400, 300).unwrap();
        assert_eq!((out.width(), out.height()), (400, 300));
    }

    #[test]
    fn fill_exact_size_is_borrowed() {
        let src = gradient_canvas(40, 30);
        let out = fill(&src, 40, 30).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    // =========================================================================
    // crop
    // =========================================================================

    #[test]
    fn crop_full_size_at_origin_is_identity() {
        let src = gradient_canvas(9, 6);
        assert_eq!(crop(&src, 9, 6, 0, 0).unwrap(), src);
    }

    #[test]
    fn crop_positive_offset_moves_window_into_image() {
        let src = gradient_canvas(10, 10);
        let out = crop(&src, 4, 3, 2, 5).unwrap();
        assert_eq!((out.width(), out.height()), (4, 3));
        assert_eq!(out.get_pixel(0, 0).unwrap(), src.get_pixel(2, 5).unwrap());
        assert_eq!(out.get_pixel(3, 2).unwrap(), src.get_pixel(5, 7).unwrap());
    }

    #[test]
    fn crop_negative_offset_pads_with_transparency() {
        let src = solid_canvas(4, 4, Color::rgb(9, 9, 9));
        let out = crop(&src, 6, 6, -2, -1).unwrap();
        assert_eq!(out.get_pixel(0, 0).unwrap(), Color::TRANSPARENT);
        assert_eq!(out.get_pixel(1, 3).unwrap(), Color::TRANSPARENT);
        assert_eq!(out.get_pixel(2, 1).unwrap(), Color::rgb(9, 9, 9));
        assert_eq!(out.get_pixel(5, 4).unwrap(), Color::rgb(9, 9, 9));
        assert_eq!(out.get_pixel(5, 5).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn crop_larger_than_source_pads_right_and_bottom() {
        let src = solid_canvas(2, 2, Color::rgb(1, 1, 1));
        let out = crop(&src, 3, 3, 0, 0).unwrap();
        assert_eq!(out.get_pixel(2, 2).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn crop_zero_size_is_invalid() {
        let src = gradient_canvas(4, 4);
        assert!(matches!(
            crop(&src, 0, 4, 0, 0),
            Err(ImageError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn crop_extreme_offsets_yield_transparent_window() {
        let src = solid_canvas(4, 4, Color::rgb(9, 9, 9));
        for (x, y) in [(i64::MIN, 0), (0, i64::MIN), (i64::MAX, 0), (0, i64::MAX)] {
            let out = crop(&src, 2, 2, x, y).unwrap();
            assert!(out.pixels().iter().all(|c| *c == Color::TRANSPARENT));
        }
    }

    // =========================================================================
    // allocation limits
    // =========================================================================

    #[test]
    fn resize_to_huge_canvas_is_typed_error() {
        let src = gradient_canvas(4, 4);
        assert!(matches!(
            resize(&src, u32::MAX, u32::MAX),
            Err(ImageError::CanvasTooLarge { .. })
        ));
    }

    #[test]
    fn percent_blowup_is_typed_error() {
        let src = gradient_canvas(4, 4);
        assert!(matches!(
            percent(&src, 1e6),
            Err(ImageError::CanvasTooLarge { .. })
        ));
    }
}
