//! Per-pixel color adjustments and 3×3 filters.
//!
//! Everything here mutates the buffer in place and leaves alpha alone. The
//! two convolutions read from a full copy of the source so no output pixel
//! sees an already-filtered neighbor; their one-pixel border is left as is.

use super::buffer::{CHANNELS, PixelBuffer};

/// Rec. 601 luma, the weighting used by grayscale and saturation.
#[inline]
fn luma(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// Clamp to `[0, 255]` and truncate. Float-to-int `as` casts saturate, so
/// the explicit clamp only documents the range.
#[inline]
fn to_channel(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

/// Apply `f` to the R, G, B channels of every pixel.
fn map_rgb(buf: &mut PixelBuffer, mut f: impl FnMut(u8) -> u8) {
    for px in buf.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        for c in &mut px[..3] {
            *c = f(*c);
        }
    }
}

pub fn brightness(buf: &mut PixelBuffer, delta: i32) {
    map_rgb(buf, |v| (i32::from(v).saturating_add(delta)).clamp(0, 255) as u8);
}

/// `v' = (v - 128) * factor + 128`.
pub fn contrast(buf: &mut PixelBuffer, factor: f32) {
    map_rgb(buf, |v| to_channel((f32::from(v) - 128.0) * factor + 128.0));
}

/// Move each channel toward (`factor < 1`) or away from (`factor > 1`) the
/// pixel's luma.
pub fn saturation(buf: &mut PixelBuffer, factor: f32) {
    for px in buf.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        let (r, g, b) = (f32::from(px[0]), f32::from(px[1]), f32::from(px[2]));
        let gray = luma(r, g, b);
        px[0] = to_channel(gray + (r - gray) * factor);
        px[1] = to_channel(gray + (g - gray) * factor);
        px[2] = to_channel(gray + (b - gray) * factor);
    }
}

pub fn grayscale(buf: &mut PixelBuffer) {
    for px in buf.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        let gray = to_channel(luma(
            f32::from(px[0]),
            f32::from(px[1]),
            f32::from(px[2]),
        ));
        px[..3].fill(gray);
    }
}

pub fn invert(buf: &mut PixelBuffer) {
    map_rgb(buf, |v| 255 - v);
}

/// Stretch each channel so its darkest value maps to 0 and its brightest to
/// 255. A channel with a single value throughout is left unchanged.
pub fn auto_levels(buf: &mut PixelBuffer) {
    let mut min = [u8::MAX; 3];
    let mut max = [u8::MIN; 3];
    for px in buf.as_bytes().chunks_exact(CHANNELS) {
        for c in 0..3 {
            min[c] = min[c].min(px[c]);
            max[c] = max[c].max(px[c]);
        }
    }

    for px in buf.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        for c in 0..3 {
            let range = u32::from(max[c] - min[c]);
            if range == 0 {
                continue;
            }
            px[c] = (u32::from(px[c] - min[c]) * 255 / range) as u8;
        }
    }
}

pub fn sepia(buf: &mut PixelBuffer) {
    for px in buf.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        let (r, g, b) = (f32::from(px[0]), f32::from(px[1]), f32::from(px[2]));
        px[0] = to_channel(r * 0.393 + g * 0.769 + b * 0.189);
        px[1] = to_channel(r * 0.349 + g * 0.686 + b * 0.168);
        px[2] = to_channel(r * 0.272 + g * 0.534 + b * 0.131);
    }
}

/// 3×3 sharpen: `[0,-1,0; -1,5,-1; 0,-1,0]`.
pub fn sharpen(buf: &mut PixelBuffer) {
    convolve_interior(buf, |src, i, stride| {
        let v = 5 * i32::from(src[i])
            - i32::from(src[i - stride])
            - i32::from(src[i + stride])
            - i32::from(src[i - CHANNELS])
            - i32::from(src[i + CHANNELS]);
        v.clamp(0, 255) as u8
    });
}

/// 3×3 unweighted box blur.
pub fn blur(buf: &mut PixelBuffer) {
    convolve_interior(buf, |src, i, stride| {
        let mut sum = 0u32;
        for row in [i - stride, i, i + stride] {
            sum += u32::from(src[row - CHANNELS])
                + u32::from(src[row])
                + u32::from(src[row + CHANNELS]);
        }
        (sum / 9) as u8
    });
}

/// Run `kernel` for the R, G, B byte of every non-border pixel. The kernel
/// gets a snapshot of the source, the byte index, and the row stride.
fn convolve_interior(buf: &mut PixelBuffer, kernel: impl Fn(&[u8], usize, usize) -> u8) {
    let (w, h) = (buf.width() as usize, buf.height() as usize);
    if w < 3 || h < 3 {
        return;
    }
    let stride = buf.stride();
    let src = buf.as_bytes().to_vec();
    let dst = buf.as_bytes_mut();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let base = y * stride + x * CHANNELS;
            for c in 0..3 {
                dst[base + c] = kernel(&src, base + c, stride);
            }
        }
    }
}
