//! Pure Rust codec built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, BMP, GIF, TIFF, WebP) | `image::load_from_memory` → `to_rgba8` |
//! | Decode animated GIF | `image::codecs::gif::GifDecoder` + `AnimationDecoder` |
//! | Encode PNG / BMP | `image::save_buffer_with_format` |
//! | Encode JPEG | `image::codecs::jpeg::JpegEncoder` (quality 90, alpha dropped) |

use super::buffer::PixelBuffer;
use super::codec::{CodecError, DecodedAnimation, ImageCodec, OutputFormat};
use image::codecs::gif::GifDecoder;
use image::codecs::jpeg::JpegEncoder;
use image::{AnimationDecoder, DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, RgbaImage};
use std::io::{BufWriter, Cursor};
use std::path::Path;

/// Codec backed by the `image` crate's pure Rust decoders and encoders.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn into_buffer(img: RgbaImage) -> Result<PixelBuffer, CodecError> {
    let (w, h) = img.dimensions();
    PixelBuffer::from_raw(w, h, img.into_raw())
        .ok_or_else(|| CodecError::Decode("decoder returned a short pixel buffer".into()))
}

/// Milliseconds as the `image` crate reports them, back to GIF centiseconds.
fn delay_centiseconds(frame: &image::Frame) -> u32 {
    let (numer, denom) = frame.delay().numer_denom_ms();
    if denom == 0 { 0 } else { numer / denom / 10 }
}

impl ImageCodec for RustCodec {
    fn decode_static(&self, bytes: &[u8]) -> Result<PixelBuffer, CodecError> {
        let img = image::load_from_memory(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
        into_buffer(img.to_rgba8())
    }

    fn decode_animated(&self, bytes: &[u8]) -> Result<DecodedAnimation, CodecError> {
        let decoder =
            GifDecoder::new(Cursor::new(bytes)).map_err(|e| CodecError::Decode(e.to_string()))?;
        let frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        let mut out = DecodedAnimation {
            frames: Vec::with_capacity(frames.len()),
            delays_cs: Vec::with_capacity(frames.len()),
        };
        for frame in frames {
            out.delays_cs.push(delay_centiseconds(&frame));
            out.frames.push(into_buffer(frame.into_buffer())?);
        }
        Ok(out)
    }

    fn encode(&self, buffer: &PixelBuffer, path: &Path) -> Result<(), CodecError> {
        let (w, h) = (buffer.width(), buffer.height());
        let encode_err = |e: image::ImageError| CodecError::Encode(format!("{}: {e}", path.display()));

        match OutputFormat::from_path(path) {
            OutputFormat::Png => image::save_buffer_with_format(
                path,
                buffer.as_bytes(),
                w,
                h,
                ExtendedColorType::Rgba8,
                ImageFormat::Png,
            )
            .map_err(encode_err),
            OutputFormat::Bmp => image::save_buffer_with_format(
                path,
                buffer.as_bytes(),
                w,
                h,
                ExtendedColorType::Rgba8,
                ImageFormat::Bmp,
            )
            .map_err(encode_err),
            OutputFormat::Jpeg => {
                let rgba = RgbaImage::from_raw(w, h, buffer.as_bytes().to_vec())
                    .ok_or_else(|| CodecError::Encode("pixel buffer size mismatch".into()))?;
                let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
                let writer = BufWriter::new(std::fs::File::create(path)?);
                JpegEncoder::new_with_quality(writer, OutputFormat::JPEG_QUALITY)
                    .write_image(rgb.as_raw(), w, h, ExtendedColorType::Rgb8)
                    .map_err(encode_err)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame};

    /// Encode solid-color frames as an animated GIF with the given delays (ms).
    pub(crate) fn gif_bytes(colors: &[[u8; 4]], delays_ms: &[u32], w: u32, h: u32) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut out);
            let frames = colors.iter().zip(delays_ms).map(|(rgba, ms)| {
                Frame::from_parts(
                    RgbaImage::from_pixel(w, h, image::Rgba(*rgba)),
                    0,
                    0,
                    Delay::from_numer_denom_ms(*ms, 1),
                )
            });
            encoder.encode_frames(frames).unwrap();
        }
        out
    }

    pub(crate) fn png_bytes(buffer: &PixelBuffer) -> Vec<u8> {
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(
                buffer.as_bytes(),
                buffer.width(),
                buffer.height(),
                ExtendedColorType::Rgba8,
            )
            .unwrap();
        out
    }

    fn pattern() -> PixelBuffer {
        PixelBuffer::from_fn(5, 3, |x, y| [x as u8 * 40, y as u8 * 80, 7, 255 - x as u8])
    }

    #[test]
    fn decode_png_to_rgba() {
        let src = pattern();
        let decoded = RustCodec::new().decode_static(&png_bytes(&src)).unwrap();
        assert_eq!(decoded, src);
    }

    #[test]
    fn decode_garbage_errors() {
        let result = RustCodec::new().decode_static(b"definitely not an image");
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn decode_rgb_jpeg_gains_alpha() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.jpg");
        let codec = RustCodec::new();
        codec
            .encode(&PixelBuffer::filled(16, 8, [200, 30, 30, 10]), &path)
            .unwrap();
        let decoded = codec.decode_static(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
        // JPEG has no alpha channel; it decodes as opaque
        assert_eq!(decoded.pixel(3, 3)[3], 255);
    }

    #[test]
    fn decode_animated_gif_frames_and_delays() {
        let bytes = gif_bytes(
            &[[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]],
            &[70, 0, 1000],
            4,
            4,
        );
        let anim = RustCodec::new().decode_animated(&bytes).unwrap();
        assert_eq!(anim.frames.len(), 3);
        assert_eq!(anim.delays_cs, vec![7, 0, 100]);
        assert_eq!(anim.frames[1].pixel(2, 2), [0, 255, 0, 255]);
    }

    #[test]
    fn decode_animated_rejects_png() {
        let result = RustCodec::new().decode_animated(&png_bytes(&pattern()));
        assert!(result.is_err());
    }

    #[test]
    fn encode_png_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.png");
        let codec = RustCodec::new();
        codec.encode(&pattern(), &path).unwrap();
        let back = codec.decode_static(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(back, pattern());
    }

    #[test]
    fn encode_bmp_writes_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.bmp");
        RustCodec::new().encode(&pattern(), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"BM"));
    }

    #[test]
    fn encode_unknown_extension_is_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.xyz");
        RustCodec::new().encode(&pattern(), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn encode_into_missing_directory_errors() {
        let result = RustCodec::new().encode(&pattern(), Path::new("/nonexistent/dir/out.jpg"));
        assert!(result.is_err());
    }
}
