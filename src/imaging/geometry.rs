//! Rotation, flipping, and cropping.
//!
//! Rotations and crops allocate and fully populate a new [`PixelBuffer`]
//! before returning it, so the caller swaps buffers in a single assignment.
//! Flips work in place on the existing allocation.

use super::buffer::{CHANNELS, PixelBuffer};
use super::calculations::{CropRegion, clamp_crop_region};

/// Rotate 90° clockwise. Source `(x, y)` lands at `(height - 1 - y, x)`.
pub fn rotate_right(src: &PixelBuffer) -> PixelBuffer {
    let (w, h) = (src.width(), src.height());
    let mut out = PixelBuffer::new(h, w);
    for y in 0..h {
        for x in 0..w {
            out.put_pixel(h - 1 - y, x, src.pixel(x, y));
        }
    }
    out
}

/// Rotate 90° counter-clockwise. Source `(x, y)` lands at `(y, width - 1 - x)`.
pub fn rotate_left(src: &PixelBuffer) -> PixelBuffer {
    let (w, h) = (src.width(), src.height());
    let mut out = PixelBuffer::new(h, w);
    for y in 0..h {
        for x in 0..w {
            out.put_pixel(y, w - 1 - x, src.pixel(x, y));
        }
    }
    out
}

/// Mirror left-right in place.
pub fn flip_horizontal(buf: &mut PixelBuffer) {
    let w = buf.width() as usize;
    let stride = buf.stride();
    if stride == 0 {
        return;
    }
    for row in buf.as_bytes_mut().chunks_exact_mut(stride) {
        for x in 0..w / 2 {
            let left = x * CHANNELS;
            let right = (w - 1 - x) * CHANNELS;
            for c in 0..CHANNELS {
                row.swap(left + c, right + c);
            }
        }
    }
}

/// Mirror top-bottom in place, swapping whole rows through a one-row buffer.
pub fn flip_vertical(buf: &mut PixelBuffer) {
    let h = buf.height() as usize;
    let stride = buf.stride();
    let mut tmp = vec![0u8; stride];
    let data = buf.as_bytes_mut();
    for y in 0..h / 2 {
        let top = y * stride;
        let bot = (h - 1 - y) * stride;
        tmp.copy_from_slice(&data[top..top + stride]);
        data.copy_within(bot..bot + stride, top);
        data[bot..bot + stride].copy_from_slice(&tmp);
    }
}

/// Cut out the region at `(x, y)` of size `w × h`, clamped to the source.
///
/// Returns `None` when nothing of the region overlaps the image.
pub fn crop(src: &PixelBuffer, x: i64, y: i64, w: i64, h: i64) -> Option<PixelBuffer> {
    let CropRegion {
        x,
        y,
        width,
        height,
    } = clamp_crop_region(src.dimensions(), x, y, w, h)?;

    let row_bytes = width as usize * CHANNELS;
    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in y..y + height {
        let start = src.offset(x, row);
        pixels.extend_from_slice(&src.as_bytes()[start..start + row_bytes]);
    }
    PixelBuffer::from_raw(width, height, pixels)
}
