//! Alpha masking from a second image's red channel.
//!
//! The target is first reframed to the mask's size (see
//! [`operations::crop`](super::operations::crop)), then every pixel's alpha is
//! replaced with `127 - floor(red / 2)` read from the mask at the same
//! coordinate:
//!
//! | mask red | resulting alpha |
//! |---|---|
//! | 255 (white) | 0, opaque |
//! | 128 | 63 |
//! | 0 (black) | 127, transparent |
//!
//! The target's RGB is kept; its old alpha is discarded, not blended.

use super::backend::Result;
use super::canvas::{ALPHA_TRANSPARENT, Color, PixelCanvas};
use super::operations::crop;

/// Alpha value produced by a mask pixel.
pub fn mask_alpha(mask_pixel: Color) -> u8 {
    ALPHA_TRANSPARENT - mask_pixel.red / 2
}

/// Crop `target` to the mask's size at `(offset_x, offset_y)` and take its
/// alpha channel from the mask.
pub fn apply_mask(
    target: &PixelCanvas,
    mask: &PixelCanvas,
    offset_x: i64,
    offset_y: i64,
) -> Result<PixelCanvas> {
    let mut out = crop(target, mask.width(), mask.height(), offset_x, offset_y)?;

    for (px, m) in out.pixels_mut().iter_mut().zip(mask.pixels()) {
        px.alpha = mask_alpha(*m);
    }

    log::debug!(
        "mask {}x{} applied at ({offset_x}, {offset_y})",
        mask.width(),
        mask.height()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_canvas, solid_canvas};

    #[test]
    fn white_mask_makes_everything_opaque() {
        let target = solid_canvas(6, 4, Color::rgba(10, 20, 30, 90));
        let mask = solid_canvas(6, 4, Color::rgb(255, 255, 255));
        let out = apply_mask(&target, &mask, 0, 0).unwrap();
        for px in out.pixels() {
            assert_eq!(*px, Color::rgb(10, 20, 30));
        }
    }

    #[test]
    fn black_mask_makes_everything_transparent() {
        let target = solid_canvas(6, 4, Color::rgb(10, 20, 30));
        let mask = solid_canvas(6, 4, Color::rgb(0, 0, 0));
        let out = apply_mask(&target, &mask, 0, 0).unwrap();
        for px in out.pixels() {
            assert_eq!(px.alpha, 127);
            // RGB survives even when fully transparent.
            assert_eq!((px.red, px.green, px.blue), (10, 20, 30));
        }
    }

    #[test]
    fn only_red_channel_matters() {
        assert_eq!(mask_alpha(Color::rgb(128, 0, 0)), 63);
        assert_eq!(mask_alpha(Color::rgb(128, 255, 255)), 63);
        assert_eq!(mask_alpha(Color::rgb(1, 0, 0)), 127);
        assert_eq!(mask_alpha(Color::rgb(254, 0, 0)), 0);
    }

    #[test]
    fn result_takes_mask_dimensions() {
        let target = gradient_canvas(20, 20);
        let mask = solid_canvas(5, 3, Color::rgb(255, 0, 0));
        let out = apply_mask(&target, &mask, 0, 0).unwrap();
        assert_eq!((out.width(), out.height()), (5, 3));
    }

    #[test]
    fn offset_selects_target_window() {
        let target = gradient_canvas(20, 20);
        let mask = solid_canvas(4, 4, Color::rgb(255, 255, 255));
        let out = apply_mask(&target, &mask, 3, 7).unwrap();
        assert_eq!(out.get_pixel(0, 0).unwrap(), target.get_pixel(3, 7).unwrap());
        assert_eq!(out.get_pixel(3, 3).unwrap(), target.get_pixel(6, 10).unwrap());
    }

    #[test]
    fn mask_larger_than_target_keeps_padding_rgb_black() {
        let target = solid_canvas(2, 2, Color::rgb(50, 60, 70));
        let mask = solid_canvas(3, 3, Color::rgb(255, 255, 255));
        let out = apply_mask(&target, &mask, 0, 0).unwrap();
        assert_eq!(out.get_pixel(0, 0).unwrap(), Color::rgb(50, 60, 70));
        // Padding was transparent black; a white mask makes it opaque black.
        assert_eq!(out.get_pixel(2, 2).unwrap(), Color::rgb(0, 0, 0));
    }

    #[test]
    fn per_pixel_gradient_mask() {
        let target = solid_canvas(256, 1, Color::rgb(1, 2, 3));
        let mask = PixelCanvas::from_fn(256, 1, |x, _| Color::rgb(x as u8, 0, 0)).unwrap();
        let out = apply_mask(&target, &mask, 0, 0).unwrap();
        for x in 0..256u32 {
            let expected = 127 - (x as u8) / 2;
            assert_eq!(out.get_pixel(x, 0).unwrap().alpha, expected);
        }
    }
}
