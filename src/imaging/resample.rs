//! Image resizing: fast bilinear and quality Lanczos-3.
//!
//! Both return a new [`PixelBuffer`] and leave the source untouched, so a
//! caller can swap the result in with one assignment. A zero target edge or
//! an empty source yields `None`.
//!
//! ## Lanczos-3
//!
//! For destination pixel `(x, y)` the source position is
//! `((x + 0.5) * sx - 0.5, (y + 0.5) * sy - 0.5)`. A 6×6 neighbourhood around
//! it is weighted by `L(dx) * L(dy)` with `L(t) = sinc(t) * sinc(t / 3)` for
//! `|t| < 3`, and the sum is normalized by the total weight. Neighbours
//! outside the image repeat the nearest edge pixel.
//!
//! The six horizontal taps depend only on the destination column, so they
//! are computed once per column and shared by every row; the vertical taps
//! are computed once per row. Output rows are independent of each other and
//! only read the source, so they are filled in parallel on the `rayon` pool
//! with no locking. The buffer is returned only after every row finishes.

use super::buffer::{CHANNELS, PixelBuffer};
use rayon::prelude::*;
use std::f64::consts::PI;
use std::time::Instant;

/// Lobes per side.
const LANCZOS_A: f64 = 3.0;
/// Taps per axis: offsets `-2..=3` around `floor(src)`.
const TAPS: usize = 6;

/// Bilinear resize. Source coordinate is `dst * src_len / dst_len`; the
/// right and bottom neighbours clamp to the last column/row.
pub fn bilinear(src: &PixelBuffer, new_width: u32, new_height: u32) -> Option<PixelBuffer> {
    if new_width == 0 || new_height == 0 || src.is_empty() {
        return None;
    }
    let (sw, sh) = (src.width(), src.height());
    let x_ratio = sw as f32 / new_width as f32;
    let y_ratio = sh as f32 / new_height as f32;
    let data = src.as_bytes();

    let mut out = PixelBuffer::new(new_width, new_height);
    let stride = out.stride();
    for (y, row) in out.as_bytes_mut().chunks_exact_mut(stride).enumerate() {
        let fy = y as f32 * y_ratio;
        let y0 = (fy as u32).min(sh - 1);
        let y1 = (y0 + 1).min(sh - 1);
        let ty = fy - y0 as f32;

        for x in 0..new_width {
            let fx = x as f32 * x_ratio;
            let x0 = (fx as u32).min(sw - 1);
            let x1 = (x0 + 1).min(sw - 1);
            let tx = fx - x0 as f32;

            let (i00, i10) = (src.offset(x0, y0), src.offset(x1, y0));
            let (i01, i11) = (src.offset(x0, y1), src.offset(x1, y1));
            let dst = x as usize * CHANNELS;
            for c in 0..CHANNELS {
                let top = f32::from(data[i00 + c]) * (1.0 - tx) + f32::from(data[i10 + c]) * tx;
                let bot = f32::from(data[i01 + c]) * (1.0 - tx) + f32::from(data[i11 + c]) * tx;
                row[dst + c] = (top * (1.0 - ty) + bot * ty) as u8;
            }
        }
    }
    Some(out)
}

/// Windowed sinc with three lobes.
fn lanczos_kernel(t: f64) -> f64 {
    if t == 0.0 {
        return 1.0;
    }
    if t.abs() >= LANCZOS_A {
        return 0.0;
    }
    let pt = PI * t;
    (pt.sin() / pt) * ((pt / LANCZOS_A).sin() / (pt / LANCZOS_A))
}

/// Clamped source indices and kernel weights for one destination coordinate.
#[derive(Debug, Clone, Copy)]
struct Taps {
    index: [usize; TAPS],
    weight: [f64; TAPS],
}

impl Taps {
    fn new(dst: u32, scale: f64, src_len: u32) -> Self {
        let pos = (f64::from(dst) + 0.5) * scale - 0.5;
        let base = pos.floor() as i64;
        let last = i64::from(src_len) - 1;
        let mut taps = Taps {
            index: [0; TAPS],
            weight: [0.0; TAPS],
        };
        for k in 0..TAPS {
            let i = base - 2 + k as i64;
            taps.index[k] = i.clamp(0, last) as usize;
            taps.weight[k] = lanczos_kernel(pos - i as f64);
        }
        taps
    }
}

/// Lanczos-3 resize, rows computed in parallel.
pub fn lanczos3(src: &PixelBuffer, new_width: u32, new_height: u32) -> Option<PixelBuffer> {
    if new_width == 0 || new_height == 0 || src.is_empty() {
        return None;
    }
    let started = Instant::now();
    let (sw, sh) = (src.width(), src.height());
    let x_scale = f64::from(sw) / f64::from(new_width);
    let y_scale = f64::from(sh) / f64::from(new_height);

    let columns: Vec<Taps> = (0..new_width)
        .map(|x| Taps::new(x, x_scale, sw))
        .collect();
    let data = src.as_bytes();
    let src_stride = src.stride();

    let mut out = PixelBuffer::new(new_width, new_height);
    let stride = out.stride();
    out.as_bytes_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let rows = Taps::new(y as u32, y_scale, sh);
            for (x, cols) in columns.iter().enumerate() {
                let mut acc = [0.0f64; CHANNELS];
                let mut weight_sum = 0.0;
                for j in 0..TAPS {
                    let line = rows.index[j] * src_stride;
                    for i in 0..TAPS {
                        let w = cols.weight[i] * rows.weight[j];
                        let p = line + cols.index[i] * CHANNELS;
                        for c in 0..CHANNELS {
                            acc[c] += f64::from(data[p + c]) * w;
                        }
                        weight_sum += w;
                    }
                }

                let px = &mut row[x * CHANNELS..(x + 1) * CHANNELS];
                if weight_sum > 0.0 {
                    for c in 0..CHANNELS {
                        px[c] = (acc[c] / weight_sum + 0.5).clamp(0.0, 255.0) as u8;
                    }
                } else {
                    px.copy_from_slice(&[0, 0, 0, 255]);
                }
            }
        });

    tracing::trace!(
        "Lanczos {}x{} -> {}x{} in {:?}",
        sw,
        sh,
        new_width,
        new_height,
        started.elapsed()
    );
    Some(out)
}
