//! Area-weighted resampling.
//!
//! Every destination pixel covers a rectangle of the source grid. Its value is
//! the average of the source pixels under that rectangle, each weighted by
//! the fraction of it that lies inside. Partial coverage at the rectangle
//! edges is what makes downscales smooth instead of nearest-neighbor.
//!
//! Color channels are weighted by opacity as well as area, so fully
//! transparent pixels contribute coverage but never bleed their (usually
//! black) RGB into visible neighbors.
//!
//! Destination rows are independent and are computed in parallel with rayon.

use super::backend::Result;
use super::canvas::{ALPHA_TRANSPARENT, Color, PixelCanvas, check_dimensions};
use rayon::prelude::*;

/// Source contributions for one destination index along one axis.
type Span = Vec<(u32, f64)>;

/// Resize `src` to exactly `dst_width × dst_height`.
///
/// Same-size resamples reproduce opaque and partially transparent pixels
/// exactly; fully transparent pixels come back as transparent black.
pub fn resample(src: &PixelCanvas, dst_width: u32, dst_height: u32) -> Result<PixelCanvas> {
    check_dimensions(dst_width, dst_height)?;
    let mut dst = PixelCanvas::allocate(dst_width, dst_height)?;

    let x_spans = axis_spans(src.width(), dst_width);
    let y_spans = axis_spans(src.height(), dst_height);

    dst.pixels_mut()
        .par_chunks_mut(dst_width as usize)
        .zip(y_spans.par_iter())
        .for_each(|(row, y_span)| {
            for (out, x_span) in row.iter_mut().zip(&x_spans) {
                *out = average(src, x_span, y_span);
            }
        });

    log::trace!(
        "resampled {}x{} -> {}x{}",
        src.width(),
        src.height(),
        dst_width,
        dst_height
    );
    Ok(dst)
}

/// For each destination index, the source indices it overlaps and by how much.
fn axis_spans(src_len: u32, dst_len: u32) -> Vec<Span> {
    let scale = f64::from(src_len) / f64::from(dst_len);
    let src_end = f64::from(src_len);

    (0..dst_len)
        .map(|d| {
            let start = f64::from(d) * scale;
            let end = (f64::from(d + 1) * scale).min(src_end);
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).clamp(first + 1, src_len);

            (first..last)
                .filter_map(|s| {
                    let lo = start.max(f64::from(s));
                    let hi = end.min(f64::from(s) + 1.0);
                    let weight = hi - lo;
                    (weight > 1e-9).then_some((s, weight))
                })
                .collect()
        })
        .collect()
}

fn average(src: &PixelCanvas, x_span: &Span, y_span: &Span) -> Color {
    let mut area = 0.0;
    let mut coverage = 0.0;
    let mut red = 0.0;
    let mut green = 0.0;
    let mut blue = 0.0;

    for &(sy, wy) in y_span {
        for &(sx, wx) in x_span {
            let weight = wx * wy;
            let px = src.at(sx, sy);
            let opaque_weight = weight * px.opacity();
            area += weight;
            coverage += opaque_weight;
            red += f64::from(px.red) * opaque_weight;
            green += f64::from(px.green) * opaque_weight;
            blue += f64::from(px.blue) * opaque_weight;
        }
    }

    if coverage <= 0.0 || area <= 0.0 {
        return Color::TRANSPARENT;
    }

    let opacity = coverage / area;
    let alpha = (f64::from(ALPHA_TRANSPARENT) * (1.0 - opacity)).round();
    Color::rgba(
        channel(red / coverage),
        channel(green / coverage),
        channel(blue / coverage),
        alpha.clamp(0.0, f64::from(ALPHA_TRANSPARENT)) as u8,
    )
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
