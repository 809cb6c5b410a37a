//! Grayscale, threshold, then stretch to the display resolution.
//!
//! The order matters for bit parity with assets produced by earlier tooling: thresholding happens
//! at source resolution and the two-level mask is then resampled with nearest-neighbour, which
//! cannot introduce intermediate levels.

use image::{GrayImage, RgbaImage};

use crate::{
    foundation::core::{TARGET_HEIGHT, TARGET_WIDTH, Threshold},
    frame::BinaryFrame,
    source::RawFrame,
};

/// ITU-R 601-2 luma in 16.16 fixed point, rounded. Alpha is ignored.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let l = u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000;
    (l >> 16) as u8
}

pub fn to_gray(img: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b, _] = img.get_pixel(x, y).0;
        image::Luma([luma(r, g, b)])
    })
}

/// Two-level mask at source resolution, row-major.
pub fn binarize(gray: &GrayImage, threshold: Threshold) -> Vec<bool> {
    gray.pixels().map(|p| threshold.is_lit(p.0[0])).collect()
}

/// Source coordinate sampled for `dst` when stretching `src_len` onto `dst_len` (pixel centres).
pub fn nearest_source(dst: u32, src_len: u32, dst_len: u32) -> u32 {
    let pos = (u64::from(dst) * 2 + 1) * u64::from(src_len) / (u64::from(dst_len) * 2);
    (pos as u32).min(src_len.saturating_sub(1))
}

/// Stretch a `width x height` mask to the target resolution. Aspect ratio is not kept.
pub fn resize_nearest(mask: &[bool], width: u32, height: u32) -> BinaryFrame {
    debug_assert_eq!(mask.len(), (width as usize) * (height as usize));
    if width == 0 || height == 0 {
        return BinaryFrame::filled(false);
    }
    let xs: Vec<u32> = (0..TARGET_WIDTH)
        .map(|x| nearest_source(x, width, TARGET_WIDTH))
        .collect();
    BinaryFrame::from_fn(|x, y| {
        let sy = nearest_source(y, height, TARGET_HEIGHT);
        mask[(sy * width + xs[x as usize]) as usize]
    })
}

/// Convert one decoded frame to a display frame. Pure.
pub fn transform(frame: &RawFrame, threshold: Threshold) -> BinaryFrame {
    let gray = to_gray(&frame.image);
    let mask = binarize(&gray, threshold);
    resize_nearest(&mask, gray.width(), gray.height())
}
