//! Positioned copy and rotation.

use super::backend::{ImageError, Result};
use super::canvas::{ALPHA_TRANSPARENT, Color, PixelCanvas};

/// Angles closer than this to a multiple of 90° take the exact orthogonal path.
const ORTHOGONAL_EPSILON: f64 = 1e-6;

/// Copy all of `src` into `dst` with its top-left corner at `(dst_x, dst_y)`.
///
/// Pixels are overwritten, not blended. Whatever part of `src` falls outside
/// `dst` is silently dropped.
pub fn copy_into(dst: &mut PixelCanvas, src: &PixelCanvas, dst_x: i64, dst_y: i64) {
    let dst_w = i64::from(dst.width());
    let dst_h = i64::from(dst.height());
    let src_w = i64::from(src.width());
    let src_h = i64::from(src.height());

    let x0 = dst_x.max(0);
    let x1 = dst_x.saturating_add(src_w).min(dst_w);
    let y0 = dst_y.max(0);
    let y1 = dst_y.saturating_add(src_h).min(dst_h);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let src_x0 = (x0 - dst_x) as usize;
    let len = (x1 - x0) as usize;
    for y in y0..y1 {
        let src_row = &src.row((y - dst_y) as u32)[src_x0..src_x0 + len];
        dst.row_mut(y as u32)[x0 as usize..x0 as usize + len].copy_from_slice(src_row);
    }
}

/// Rotate `src` counter-clockwise by `angle` degrees.
///
/// The result is sized to the bounding box of the rotated content; area not
/// covered by the source is fully transparent. Multiples of 90° are lossless
/// pixel permutations, other angles are bilinear. A NaN or infinite angle is
/// rejected as [`ImageError::InvalidAngle`].
pub fn rotate(src: &PixelCanvas, angle: f64) -> Result<PixelCanvas> {
    if !angle.is_finite() {
        return Err(ImageError::InvalidAngle(angle));
    }
    let angle = angle.rem_euclid(360.0);
    let quarter = (angle / 90.0).round();
    if (angle - quarter * 90.0).abs() < ORTHOGONAL_EPSILON {
        return rotate_orthogonal(src, quarter as u32 % 4);
    }

    let (sin, cos) = angle.to_radians().sin_cos();
    let w = f64::from(src.width());
    let h = f64::from(src.height());
    let (new_w, new_h) = rotated_bounds(w, h, sin, cos);
    let mut dst = PixelCanvas::allocate(new_w, new_h)?;

    let cx_src = w / 2.0;
    let cy_src = h / 2.0;
    let cx_dst = f64::from(new_w) / 2.0;
    let cy_dst = f64::from(new_h) / 2.0;

    for dy in 0..new_h {
        let row = dst.row_mut(dy);
        for (dx, out) in row.iter_mut().enumerate() {
            // Pixel centers, y axis pointing down.
            let x_rel = dx as f64 + 0.5 - cx_dst;
            let y_rel = f64::from(dy) + 0.5 - cy_dst;
            let sx = x_rel * cos - y_rel * sin + cx_src;
            let sy = x_rel * sin + y_rel * cos + cy_src;
            *out = bilinear(src, sx - 0.5, sy - 0.5);
        }
    }

    log::trace!(
        "rotated {}x{} by {angle}° -> {new_w}x{new_h}",
        src.width(),
        src.height()
    );
    Ok(dst)
}

/// Bounding box of a `w × h` rectangle rotated by the given angle.
fn rotated_bounds(w: f64, h: f64, sin: f64, cos: f64) -> (u32, u32) {
    let bw = (w * cos).abs() + (h * sin).abs();
    let bh = (w * sin).abs() + (h * cos).abs();
    // Trim float noise so e.g. 45° on a 10x10 yields 15, not 16.
    let snap = |v: f64| ((v - 1e-9).ceil() as u32).max(1);
    (snap(bw), snap(bh))
}

fn rotate_orthogonal(src: &PixelCanvas, quarters: u32) -> Result<PixelCanvas> {
    let (w, h) = (src.width(), src.height());
    match quarters {
        0 => Ok(src.clone()),
        // Counter-clockwise: the top-right corner becomes the top-left.
        1 => PixelCanvas::from_fn(h, w, |x, y| src.at(w - 1 - y, x)),
        2 => PixelCanvas::from_fn(w, h, |x, y| src.at(w - 1 - x, h - 1 - y)),
        _ => PixelCanvas::from_fn(h, w, |x, y| src.at(y, h - 1 - x)),
    }
}

/// Bilinear sample at fractional pixel index; outside samples are transparent.
fn bilinear(src: &PixelCanvas, x: f64, y: f64) -> Color {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let sample = |sx: i64, sy: i64| -> Color {
        if sx < 0 || sy < 0 || sx >= i64::from(src.width()) || sy >= i64::from(src.height()) {
            Color::TRANSPARENT
        } else {
            src.at(sx as u32, sy as u32)
        }
    };

    let taps = [
        (sample(x0, y0), (1.0 - fx) * (1.0 - fy)),
        (sample(x0 + 1, y0), fx * (1.0 - fy)),
        (sample(x0, y0 + 1), (1.0 - fx) * fy),
        (sample(x0 + 1, y0 + 1), fx * fy),
    ];

    let mut coverage = 0.0;
    let mut rgb = [0.0f64; 3];
    for (px, weight) in taps {
        let w = weight * px.opacity();
        coverage += w;
        rgb[0] += f64::from(px.red) * w;
        rgb[1] += f64::from(px.green) * w;
        rgb[2] += f64::from(px.blue) * w;
    }
    if coverage <= 1e-9 {
        return Color::TRANSPARENT;
    }

    let to_u8 = |v: f64| (v / coverage).round().clamp(0.0, 255.0) as u8;
    let alpha = (f64::from(ALPHA_TRANSPARENT) * (1.0 - coverage))
        .round()
        .clamp(0.0, f64::from(ALPHA_TRANSPARENT)) as u8;
    Color::rgba(to_u8(rgb[0]), to_u8(rgb[1]), to_u8(rgb[2]), alpha)
}
