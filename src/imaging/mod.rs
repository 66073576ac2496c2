//! Pixel-level image processing: buffers, metadata, transforms, resampling.
//!
//! | Operation | Module / implementation |
//! |---|---|
//! | **Decode / encode** | [`ImageCodec`] seam, [`RustCodec`] over the `image` crate |
//! | **EXIF metadata** | custom parser (JPEG APP1 + TIFF IFD) |
//! | **Rotate / flip / crop** | [`geometry`] |
//! | **Color adjustments, 3×3 filters** | [`adjust`] |
//! | **Resize** | [`resample`]: bilinear, and Lanczos-3 with rows on `rayon` |
//!
//! The module is split into:
//! - **Buffer**: [`PixelBuffer`], the RGBA8 unit every operation works on
//! - **Calculations**: Pure functions for dimension and timing math (unit testable)
//! - **Codec**: [`ImageCodec`] trait + [`RustCodec`]
//! - **Operations**: `geometry`, `adjust`, `resample`, each a set of free
//!   functions over `PixelBuffer`

pub mod adjust;
pub mod buffer;
pub mod calculations;
pub mod codec;
pub mod exif_parser;
pub mod geometry;
pub mod resample;
pub mod rust_codec;

pub use buffer::{Dimensions, PixelBuffer};
pub use codec::{CodecError, DecodedAnimation, ImageCodec, OutputFormat};
pub use exif_parser::ExifMetadata;
pub use rust_codec::RustCodec;
