//! # pix
//!
//! The image transform & metadata engine behind a desktop image viewer.
//! It owns decoded RGBA8 pixel buffers, reads camera metadata straight out
//! of JPEG bytes, and applies geometric, photometric and resampling
//! transforms with a one-step undo.
//!
//! # Architecture
//!
//! ```text
//!              bytes ──► exif_parser ──► ExifMetadata
//!   file ──►     │
//!              bytes ──► ImageCodec ──► PixelBuffer ─┬─► geometry / adjust / resample
//!                          (GIF) ──► AnimationCache  │
//!                                                    └─► UndoHistory (one snapshot)
//! ```
//!
//! [`record::ImageRecord`] ties these together for one open file. A UI
//! layer drives it call by call; the bundled `pix` binary drives it in bulk
//! ([`batch`]) or for inspection (`pix info`).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pixel buffers, EXIF parsing, transforms, resampling, codec seam |
//! | [`animation`] | Decoded animation frames, normalized delays, playback cursor |
//! | [`history`] | Single-slot undo (swap-based, so undo doubles as redo) |
//! | [`record`] | `ImageRecord`: the per-image aggregate and its operation set |
//! | [`config`] | `pix.toml` loading and validation |
//! | [`batch`] | Folder-wide Lanczos upscale driver |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup for the binary |
//!
//! # Design Decisions
//!
//! ## Replace, Don't Patch
//!
//! Transforms that change dimensions build a complete new [`imaging::PixelBuffer`]
//! from a borrowed source and only then swap it in. A failure or a no-op
//! leaves the live buffer exactly as it was, so `width * height * 4 ==
//! pixels.len()` holds at every observable point.
//!
//! ## Uniform Undo
//!
//! Every mutating operation snapshots first, including the cheap per-pixel
//! ones. Operations that end up doing nothing (an empty crop, a zero-sized
//! resize) skip the snapshot so undo still returns to the last real edit.
//!
//! ## Parallel Lanczos Rows
//!
//! Lanczos-3 output rows are independent and read only the source, so they
//! are split across the `rayon` pool with `par_chunks_mut`. The call returns
//! after every row is written; the binary sizes the pool from `pix.toml`.
//!
//! ## Metadata Never Fails
//!
//! The EXIF reader bounds-checks every read and returns what it found so far
//! on truncated or malformed input. A broken APP1 segment costs metadata,
//! never the image.

pub mod animation;
pub mod batch;
pub mod config;
pub mod history;
pub mod imaging;
pub mod logging;
pub mod output;
pub mod record;
