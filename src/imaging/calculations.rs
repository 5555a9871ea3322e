//! Pure calculation functions for transform dimensions.
//!
//! All functions here are pure and testable without any pixels.

use super::backend::{Dimensions, ImageError, Result};
use super::params::FitPolicy;

/// Dimensions after scaling by `factor`, rounded half away from zero.
///
/// # Examples
/// ```
/// # use imgchain::imaging::calculations::percent_dimensions;
/// // 1024x768 at 10% → 102x77
/// let dims = percent_dimensions((1024, 768).into(), 0.1).unwrap();
/// assert_eq!((dims.width, dims.height), (102, 77));
/// ```
pub fn percent_dimensions(source: Dimensions, factor: f64) -> Result<Dimensions> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(ImageError::InvalidScale(factor));
    }
    let width = (f64::from(source.width) * factor).round();
    let height = (f64::from(source.height) * factor).round();
    if width < 1.0 || height < 1.0 || width > f64::from(u32::MAX) || height > f64::from(u32::MAX)
    {
        return Err(ImageError::InvalidDimensions {
            width: width.clamp(0.0, f64::from(u32::MAX)) as u32,
            height: height.clamp(0.0, f64::from(u32::MAX)) as u32,
        });
    }
    Ok(Dimensions {
        width: width as u32,
        height: height as u32,
    })
}

/// Scale factor that brings `source` within `max_width × max_height`.
///
/// Starts at 1. A width overflow sets the factor from the width; a height
/// overflow then sets it from the height, replacing the width-derived value
/// rather than taking the smaller of the two. For sources that overflow both
/// bounds, the height constraint wins even when the width would still exceed
/// its bound afterwards.
///
/// # Examples
/// ```
/// # use imgchain::imaging::calculations::fit_scale;
/// // 1024x768 in 300x300: both overflow, height wins → 300/768
/// assert_eq!(fit_scale((1024, 768).into(), 300, 300), 300.0 / 768.0);
/// ```
pub fn fit_scale(source: Dimensions, max_width: u32, max_height: u32) -> f64 {
    let mut scale = 1.0;
    if source.width > max_width {
        scale = f64::from(max_width) / f64::from(source.width);
    }
    if source.height > max_height {
        scale = f64::from(max_height) / f64::from(source.height);
    }
    scale
}

/// Scale factor for `fit` under the given policy.
///
/// [`FitPolicy::Sequential`] is [`fit_scale`]. [`FitPolicy::Contain`] takes
/// the smaller ratio, never exceeding 1.
pub fn fit_scale_with(policy: FitPolicy, source: Dimensions, max_width: u32, max_height: u32) -> f64 {
    match policy {
        FitPolicy::Sequential => fit_scale(source, max_width, max_height),
        FitPolicy::Contain => {
            let by_width = f64::from(max_width) / f64::from(source.width);
            let by_height = f64::from(max_height) / f64::from(source.height);
            by_width.min(by_height).min(1.0)
        }
    }
}

/// How `fill` reaches its target: a uniform scale, then an optional crop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillPlan {
    pub scale: f64,
    /// `false` when source and target share an aspect ratio.
    pub needs_crop: bool,
}

/// Plan a fill of `target` by `source`.
///
/// Compares `height / width` ratios: a source flatter than the target is
/// scaled to the target height, otherwise to the target width. Either way the
/// scaled image covers the target and overflows along one axis.
pub fn fill_plan(source: Dimensions, target: Dimensions) -> FillPlan {
    let image_ratio = f64::from(source.height) / f64::from(source.width);
    let target_ratio = f64::from(target.height) / f64::from(target.width);

    let scale = if image_ratio < target_ratio {
        f64::from(target.height) / f64::from(source.height)
    } else {
        f64::from(target.width) / f64::from(source.width)
    };

    FillPlan {
        scale,
        needs_crop: image_ratio != target_ratio,
    }
}

/// Crop window origin that centers `scaled` over `target`.
///
/// Returned as crop offsets: positive values move the window right/down
/// into the scaled image.
pub fn centered_crop_offset(scaled: Dimensions, target: Dimensions) -> (i64, i64) {
    let half = |t: u32, s: u32| ((f64::from(t) - f64::from(s)) / 2.0).round() as i64;
    (
        -half(target.width, scaled.width),
        -half(target.height, scaled.height),
    )
}
