//! One open image: live pixels, metadata, animation frames, undo slot.
//!
//! [`ImageRecord`] is the engine's public face. Every mutating operation
//! snapshots the live buffer into the undo slot first, then either edits it
//! in place or swaps in a fully built replacement. Operations that turn out
//! to be no-ops (an empty crop, a zero-sized resize) leave both the buffer
//! and the undo slot untouched and return `None`.
//!
//! ## Error Handling
//!
//! | Situation | Result |
//! |---|---|
//! | File unreadable | [`RecordError::Io`] |
//! | Codec rejects the bytes | [`RecordError::Decode`], record unchanged |
//! | Malformed EXIF | not an error, `exif.present == false` |
//! | Empty crop / zero size | `None`, record unchanged |
//! | Undo with no snapshot | [`RecordError::NothingToUndo`] |
//! | Upscale past configured limits | [`RecordError::TooLarge`] |

use crate::animation::{AnimationCache, FrameAdvance};
use crate::config::LimitsConfig;
use crate::history::UndoHistory;
use crate::imaging::calculations::{
    DEFAULT_FRAME_DELAY_MS, estimate_memory_bytes, scaled_dimensions,
};
use crate::imaging::codec::is_gif;
use crate::imaging::{
    CodecError, Dimensions, ExifMetadata, ImageCodec, PixelBuffer, adjust, exif_parser, geometry,
    resample,
};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const MIB: u64 = 1024 * 1024;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
    #[error("Cannot save {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Target {target} too large: {reason}")]
    TooLarge { target: Dimensions, reason: String },
}

#[derive(Debug)]
pub struct ImageRecord {
    buffer: PixelBuffer,
    exif: ExifMetadata,
    animation: Option<AnimationCache>,
    history: UndoHistory,
    path: PathBuf,
}

/// Decode `bytes`, taking the animated path for multi-frame GIFs.
fn decode(
    bytes: &[u8],
    codec: &impl ImageCodec,
) -> Result<(PixelBuffer, Option<AnimationCache>), CodecError> {
    if is_gif(bytes) {
        match codec.decode_animated(bytes) {
            Ok(decoded) => {
                if let Some(cache) = AnimationCache::from_decoded(decoded) {
                    return Ok((cache.current_frame().clone(), Some(cache)));
                }
            }
            Err(e) => tracing::debug!("Animated decode failed, trying static: {}", e),
        }
    }
    Ok((codec.decode_static(bytes)?, None))
}

impl ImageRecord {
    /// Read `path`, extract EXIF from the raw bytes, and decode the pixels.
    pub fn load(path: &Path, codec: &impl ImageCodec) -> Result<Self, RecordError> {
        let bytes = fs::read(path)?;
        let exif = exif_parser::extract(&bytes);
        let (buffer, animation) = decode(&bytes, codec).map_err(|source| RecordError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(
            "Loaded {} ({}, {} frame(s), exif: {})",
            path.display(),
            buffer.dimensions(),
            animation.as_ref().map_or(1, |a| a.frame_count()),
            exif.present
        );
        Ok(Self {
            buffer,
            exif,
            animation,
            history: UndoHistory::new(),
            path: path.to_path_buf(),
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn dimensions(&self) -> Dimensions {
        self.buffer.dimensions()
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn exif(&self) -> &ExifMetadata {
        &self.exif
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_animated(&self) -> bool {
        self.animation.is_some()
    }

    pub fn frame_count(&self) -> usize {
        self.animation.as_ref().map_or(1, |a| a.frame_count())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Delay of the frame currently shown; the default delay for stills.
    pub fn frame_delay_ms(&self) -> u32 {
        self.animation
            .as_ref()
            .map_or(DEFAULT_FRAME_DELAY_MS, |a| a.current_delay_ms())
    }

    // ------------------------------------------------------------------
    // Mutation plumbing
    // ------------------------------------------------------------------

    fn edit(&mut self, op: &str, f: impl FnOnce(&mut PixelBuffer)) -> Dimensions {
        self.history.save(&self.buffer);
        f(&mut self.buffer);
        tracing::debug!("{} on {}", op, self.buffer.dimensions());
        self.buffer.dimensions()
    }

    fn swap_in(&mut self, op: &str, next: PixelBuffer) -> Dimensions {
        self.history.save(&self.buffer);
        tracing::debug!("{}: {} -> {}", op, self.buffer.dimensions(), next.dimensions());
        self.buffer = next;
        self.buffer.dimensions()
    }

    fn replace(&mut self, op: &str, next: Option<PixelBuffer>) -> Option<Dimensions> {
        match next {
            Some(next) => Some(self.swap_in(op, next)),
            None => {
                tracing::debug!("{} skipped: nothing to do", op);
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    pub fn rotate_right(&mut self) -> Dimensions {
        let next = geometry::rotate_right(&self.buffer);
        self.swap_in("rotate right", next)
    }

    pub fn rotate_left(&mut self) -> Dimensions {
        let next = geometry::rotate_left(&self.buffer);
        self.swap_in("rotate left", next)
    }

    pub fn flip_horizontal(&mut self) -> Dimensions {
        self.edit("flip horizontal", geometry::flip_horizontal)
    }

    pub fn flip_vertical(&mut self) -> Dimensions {
        self.edit("flip vertical", geometry::flip_vertical)
    }

    /// Crop to the given rectangle, clamped to the image. `None` when the
    /// clamped region is empty.
    pub fn crop(&mut self, x: i64, y: i64, width: i64, height: i64) -> Option<Dimensions> {
        let next = geometry::crop(&self.buffer, x, y, width, height);
        self.replace("crop", next)
    }

    // ------------------------------------------------------------------
    // Color and filters
    // ------------------------------------------------------------------

    pub fn brightness(&mut self, delta: i32) -> Dimensions {
        self.edit("brightness", |b| adjust::brightness(b, delta))
    }

    pub fn contrast(&mut self, factor: f32) -> Dimensions {
        self.edit("contrast", |b| adjust::contrast(b, factor))
    }

    pub fn saturation(&mut self, factor: f32) -> Dimensions {
        self.edit("saturation", |b| adjust::saturation(b, factor))
    }

    pub fn grayscale(&mut self) -> Dimensions {
        self.edit("grayscale", adjust::grayscale)
    }

    pub fn invert(&mut self) -> Dimensions {
        self.edit("invert", adjust::invert)
    }

    pub fn auto_levels(&mut self) -> Dimensions {
        self.edit("auto levels", adjust::auto_levels)
    }

    pub fn sepia(&mut self) -> Dimensions {
        self.edit("sepia", adjust::sepia)
    }

    pub fn sharpen(&mut self) -> Dimensions {
        self.edit("sharpen", adjust::sharpen)
    }

    pub fn blur(&mut self) -> Dimensions {
        self.edit("blur", adjust::blur)
    }

    // ------------------------------------------------------------------
    // Resize
    // ------------------------------------------------------------------

    pub fn resize_bilinear(&mut self, width: u32, height: u32) -> Option<Dimensions> {
        let next = resample::bilinear(&self.buffer, width, height);
        self.replace("bilinear resize", next)
    }

    pub fn resize_lanczos(&mut self, width: u32, height: u32) -> Option<Dimensions> {
        let next = resample::lanczos3(&self.buffer, width, height);
        self.replace("lanczos resize", next)
    }

    /// Lanczos-3 upscale of both edges by `factor`, refused when the result
    /// would break `limits`. `Ok(None)` for a zero factor.
    pub fn upscale_lanczos(
        &mut self,
        factor: u32,
        limits: &LimitsConfig,
    ) -> Result<Option<Dimensions>, RecordError> {
        if factor == 0 {
            return Ok(None);
        }
        let target = scaled_dimensions(self.dimensions(), factor).ok_or_else(|| {
            RecordError::TooLarge {
                target: self.dimensions(),
                reason: format!("scaling by {factor} overflows"),
            }
        })?;
        check_limits(target, limits)?;
        Ok(self.resize_lanczos(target.width, target.height))
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Swap the live buffer with the undo snapshot.
    pub fn undo(&mut self) -> Result<Dimensions, RecordError> {
        if !self.history.undo(&mut self.buffer) {
            return Err(RecordError::NothingToUndo);
        }
        tracing::debug!("undo -> {}", self.buffer.dimensions());
        Ok(self.buffer.dimensions())
    }

    /// Re-decode the source file. The edited state becomes the undo
    /// snapshot. On failure the record is left exactly as it was.
    ///
    /// Animations restart: the live buffer is the first frame and the
    /// playback cursor points at it again.
    pub fn reset(&mut self, codec: &impl ImageCodec) -> Result<Dimensions, RecordError> {
        let bytes = fs::read(&self.path)?;
        let fresh = codec
            .decode_static(&bytes)
            .map_err(|source| RecordError::Decode {
                path: self.path.clone(),
                source,
            })?;
        if let Some(animation) = self.animation.as_mut() {
            animation.rewind();
        }
        Ok(self.swap_in("reset", fresh))
    }

    // ------------------------------------------------------------------
    // Animation and output
    // ------------------------------------------------------------------

    /// Show the next animation frame. `None` for still images.
    pub fn advance_frame(&mut self) -> Option<FrameAdvance> {
        self.animation.as_mut()?.advance(&mut self.buffer)
    }

    /// Encode the live buffer; format follows the extension of `path`.
    pub fn save(&self, path: &Path, codec: &impl ImageCodec) -> Result<(), RecordError> {
        codec
            .encode(&self.buffer, path)
            .map_err(|source| RecordError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!("Saved {} ({})", path.display(), self.buffer.dimensions());
        Ok(())
    }
}

/// Refuse `target` when it breaks the size or memory limit; warn when it is
/// merely large.
pub fn check_limits(target: Dimensions, limits: &LimitsConfig) -> Result<(), RecordError> {
    let longest = target.width.max(target.height);
    if longest > limits.max_image_size {
        return Err(RecordError::TooLarge {
            target,
            reason: format!("longest edge exceeds {} px", limits.max_image_size),
        });
    }
    let estimate = estimate_memory_bytes(target);
    let estimate_mb = estimate as f64 / MIB as f64;
    if limits.max_memory_mb > 0 && estimate > limits.max_memory_mb.saturating_mul(MIB) {
        return Err(RecordError::TooLarge {
            target,
            reason: format!(
                "needs ~{estimate_mb:.1} MB, limit is {} MB",
                limits.max_memory_mb
            ),
        });
    }
    if exceeds_warn_threshold(estimate, limits) {
        tracing::warn!("{} needs ~{:.1} MB of memory", target, estimate_mb);
    }
    Ok(())
}

fn exceeds_warn_threshold(estimate_bytes: u64, limits: &LimitsConfig) -> bool {
    limits.warn_memory_mb > 0 && estimate_bytes > limits.warn_memory_mb.saturating_mul(MIB)
}
