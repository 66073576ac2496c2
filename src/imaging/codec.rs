//! Codec boundary: compressed bytes in, RGBA8 buffers out (and back).
//!
//! The engine never decodes JPEG/PNG/GIF itself. [`ImageCodec`] is the seam;
//! the production implementation is
//! [`RustCodec`](super::rust_codec::RustCodec), and tests use a recording
//! mock so record and batch logic run without real image files.

use super::buffer::PixelBuffer;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Frames of an animated source plus their delays as stored in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAnimation {
    pub frames: Vec<PixelBuffer>,
    /// Per-frame delay in centiseconds (GIF's native unit).
    pub delays_cs: Vec<u32>,
}

/// GIF87a / GIF89a signature.
pub fn is_gif(bytes: &[u8]) -> bool {
    bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a")
}

/// Output container chosen from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    /// JPEG at quality 90.
    Jpeg,
    Bmp,
}

impl OutputFormat {
    pub const JPEG_QUALITY: u8 = 90;

    /// `.jpg`/`.jpeg` → JPEG, `.bmp` → BMP, anything else → PNG.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "bmp" => Self::Bmp,
            _ => Self::Png,
        }
    }
}

/// Trait for image codecs.
///
/// Implementations always produce RGBA8, whatever the source channel layout.
pub trait ImageCodec: Sync {
    /// Decode a single still image (the first frame for animated sources).
    fn decode_static(&self, bytes: &[u8]) -> Result<PixelBuffer, CodecError>;

    /// Decode every frame of an animated source.
    fn decode_animated(&self, bytes: &[u8]) -> Result<DecodedAnimation, CodecError>;

    /// Encode `buffer` to `path`, format chosen by [`OutputFormat::from_path`].
    fn encode(&self, buffer: &PixelBuffer, path: &Path) -> Result<(), CodecError>;
}
