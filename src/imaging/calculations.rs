//! Pure calculation functions for image dimensions and timing.
//!
//! All functions here are pure and testable without any I/O or images.

use super::buffer::Dimensions;

/// GIF delays shorter than this are treated as unset.
pub const MIN_FRAME_DELAY_MS: u32 = 20;

/// Delay substituted for missing or too-short frame delays.
pub const DEFAULT_FRAME_DELAY_MS: u32 = 100;

/// A crop rectangle that lies fully inside its source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Clamp a requested crop rectangle to the source image.
///
/// Negative origins are moved to 0 (the requested size is kept), then the
/// size is shrunk so the region ends at the image edge. Returns `None` when
/// the result has no area.
///
/// ```
/// # use pix::imaging::calculations::{clamp_crop_region, CropRegion};
/// # use pix::imaging::Dimensions;
/// let r = clamp_crop_region(Dimensions::new(100, 100), 90, 90, 50, 50).unwrap();
/// assert_eq!((r.width, r.height), (10, 10));
/// ```
pub fn clamp_crop_region(
    source: Dimensions,
    x: i64,
    y: i64,
    w: i64,
    h: i64,
) -> Option<CropRegion> {
    let x = x.max(0);
    let y = y.max(0);
    let w = w.min(i64::from(source.width) - x);
    let h = h.min(i64::from(source.height) - y);
    if w <= 0 || h <= 0 {
        return None;
    }
    Some(CropRegion {
        x: x as u32,
        y: y as u32,
        width: w as u32,
        height: h as u32,
    })
}

/// Multiply both edges by an integer factor. `None` on overflow.
pub fn scaled_dimensions(source: Dimensions, factor: u32) -> Option<Dimensions> {
    Some(Dimensions::new(
        source.width.checked_mul(factor)?,
        source.height.checked_mul(factor)?,
    ))
}

/// Bytes needed to produce an image of `target` size: the RGBA output plus
/// one working copy of the same size.
pub fn estimate_memory_bytes(target: Dimensions) -> u64 {
    target.width as u64 * target.height as u64 * 4 * 2
}

/// Convert a GIF delay (centiseconds) to milliseconds, substituting
/// [`DEFAULT_FRAME_DELAY_MS`] for anything under [`MIN_FRAME_DELAY_MS`].
pub fn normalize_frame_delay(centiseconds: u32) -> u32 {
    let ms = centiseconds.saturating_mul(10);
    if ms < MIN_FRAME_DELAY_MS {
        DEFAULT_FRAME_DELAY_MS
    } else {
        ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_inside_is_unchanged() {
        let r = clamp_crop_region(Dimensions::new(50, 40), 5, 6, 10, 12).unwrap();
        assert_eq!(
            r,
            CropRegion {
                x: 5,
                y: 6,
                width: 10,
                height: 12
            }
        );
    }

    #[test]
    fn crop_negative_origin_moves_to_zero() {
        let r = clamp_crop_region(Dimensions::new(50, 40), -5, -1, 10, 10).unwrap();
        assert_eq!((r.x, r.y, r.width, r.height), (0, 0, 10, 10));
    }

    #[test]
    fn crop_past_edge_is_none() {
        assert_eq!(clamp_crop_region(Dimensions::new(10, 10), 10, 0, 5, 5), None);
        assert_eq!(clamp_crop_region(Dimensions::new(10, 10), 0, 20, 5, 5), None);
    }

    #[test]
    fn crop_zero_size_is_none() {
        assert_eq!(clamp_crop_region(Dimensions::new(10, 10), 0, 0, 0, 0), None);
    }

    #[test]
    fn scaled_dimensions_doubles() {
        assert_eq!(
            scaled_dimensions(Dimensions::new(640, 480), 2),
            Some(Dimensions::new(1280, 960))
        );
    }

    #[test]
    fn scaled_dimensions_overflow() {
        assert_eq!(scaled_dimensions(Dimensions::new(u32::MAX, 1), 2), None);
    }

    #[test]
    fn memory_estimate_counts_working_copy() {
        assert_eq!(estimate_memory_bytes(Dimensions::new(100, 50)), 40_000);
    }

    #[test]
    fn short_delays_become_default() {
        assert_eq!(normalize_frame_delay(0), 100);
        assert_eq!(normalize_frame_delay(1), 100);
    }

    #[test]
    fn long_delays_convert_to_ms() {
        assert_eq!(normalize_frame_delay(2), 20);
        assert_eq!(normalize_frame_delay(7), 70);
        assert_eq!(normalize_frame_delay(150), 1500);
    }
}
