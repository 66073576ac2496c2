//! Decoded frames of an animated source and the playback cursor.
//!
//! The cache is built once at load time and never re-decodes. The caller
//! owns the timer: [`AnimationCache::advance`] moves to the next frame,
//! copies it into the live buffer, and returns the delay to wait before the
//! next call.

use crate::imaging::calculations::{DEFAULT_FRAME_DELAY_MS, normalize_frame_delay};
use crate::imaging::{DecodedAnimation, PixelBuffer};

/// Result of a frame advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameAdvance {
    /// Index of the frame now shown.
    pub index: usize,
    /// How long to show it, in milliseconds.
    pub delay_ms: u32,
}

#[derive(Debug, Clone)]
pub struct AnimationCache {
    frames: Vec<PixelBuffer>,
    delays_ms: Vec<u32>,
    current: usize,
}

impl AnimationCache {
    /// Build from decoder output. Returns `None` for fewer than two frames:
    /// a single-frame GIF is just a still image.
    ///
    /// Missing delays (a decoder reporting fewer delays than frames) get the
    /// default delay; every delay is normalized with
    /// [`normalize_frame_delay`].
    pub fn from_decoded(decoded: DecodedAnimation) -> Option<Self> {
        if decoded.frames.len() < 2 {
            return None;
        }
        let delays_ms = (0..decoded.frames.len())
            .map(|i| {
                decoded
                    .delays_cs
                    .get(i)
                    .map_or(DEFAULT_FRAME_DELAY_MS, |&cs| normalize_frame_delay(cs))
            })
            .collect();
        Some(Self {
            frames: decoded.frames,
            delays_ms,
            current: 0,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Move the cursor back to the first frame without touching any buffer.
    pub fn rewind(&mut self) {
        self.current = 0;
    }

    pub fn current_frame(&self) -> &PixelBuffer {
        &self.frames[self.current]
    }

    pub fn current_delay_ms(&self) -> u32 {
        self.delays_ms[self.current]
    }

    pub fn delays_ms(&self) -> &[u32] {
        &self.delays_ms
    }

    /// Step to the next frame (wrapping) and copy it into `live`.
    pub fn advance(&mut self, live: &mut PixelBuffer) -> Option<FrameAdvance> {
        if self.frames.len() < 2 {
            return None;
        }
        self.current = (self.current + 1) % self.frames.len();
        live.copy_from(&self.frames[self.current]);
        Some(FrameAdvance {
            index: self.current,
            delay_ms: self.delays_ms[self.current],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anim(colors: &[u8], delays_cs: Vec<u32>) -> DecodedAnimation {
        DecodedAnimation {
            frames: colors
                .iter()
                .map(|&c| PixelBuffer::filled(2, 2, [c, c, c, 255]))
                .collect(),
            delays_cs,
        }
    }

    #[test]
    fn single_frame_is_not_animated() {
        assert!(AnimationCache::from_decoded(anim(&[1], vec![10])).is_none());
        assert!(AnimationCache::from_decoded(anim(&[], vec![])).is_none());
    }

    #[test]
    fn delays_are_normalized() {
        let cache = AnimationCache::from_decoded(anim(&[1, 2, 3, 4], vec![0, 1, 2, 15])).unwrap();
        assert_eq!(cache.delays_ms(), &[100, 100, 20, 150]);
    }

    #[test]
    fn missing_delays_get_default() {
        let cache = AnimationCache::from_decoded(anim(&[1, 2, 3], vec![5])).unwrap();
        assert_eq!(cache.delays_ms(), &[50, 100, 100]);
    }

    #[test]
    fn advance_wraps_and_copies_frame() {
        let mut cache = AnimationCache::from_decoded(anim(&[10, 20, 30], vec![5, 6, 7])).unwrap();
        let mut live = cache.current_frame().clone();

        assert_eq!(
            cache.advance(&mut live),
            Some(FrameAdvance {
                index: 1,
                delay_ms: 60
            })
        );
        assert_eq!(live.pixel(1, 1), [20, 20, 20, 255]);

        cache.advance(&mut live);
        let wrapped = cache.advance(&mut live).unwrap();
        assert_eq!(wrapped.index, 0);
        assert_eq!(wrapped.delay_ms, 50);
        assert_eq!(live.pixel(0, 0), [10, 10, 10, 255]);
    }

    #[test]
    fn rewind_returns_to_first_frame() {
        let mut cache = AnimationCache::from_decoded(anim(&[10, 20, 30], vec![5, 6, 7])).unwrap();
        let mut live = cache.current_frame().clone();
        cache.advance(&mut live);
        cache.advance(&mut live);
        cache.rewind();
        assert_eq!(cache.current_delay_ms(), 50);
        assert_eq!(cache.current_frame().pixel(0, 0), [10, 10, 10, 255]);
        assert_eq!(cache.advance(&mut live).unwrap().index, 1);
    }

    #[test]
    fn advance_restores_frame_size_after_edit() {
        let mut cache = AnimationCache::from_decoded(anim(&[10, 20], vec![5, 5])).unwrap();
        let mut live = PixelBuffer::new(7, 1);
        cache.advance(&mut live);
        assert_eq!((live.width(), live.height()), (2, 2));
    }
}
