//! CLI output formatting for `pix` commands.
//!
//! # Output Format
//!
//! ## Upscale
//!
//! ```text
//! 001/003 a.jpg
//!     → 1280x960
//! 002/003 b.png
//!     ✗ Cannot decode photos/b.png: Decode failed: ...
//! 003/003 c.bmp
//!     → 800x600
//!
//! Upscaled 2 images, 1 failed → photos/upscaled
//! ```
//!
//! ## Info
//!
//! ```text
//! photo.jpg
//!     Size: 4000x3000
//!     Camera: Canon EOS R5
//!     Date: 2024:05:01 10:00:00
//!     Exposure: 1/250 s
//!     Aperture: f/2.8
//!     ISO: 100
//!     Focal length: 50mm
//! ```
//!
//! Animated files add `Frames:` and `Frame delay:` lines; files without
//! EXIF print `EXIF: none`.
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary};
use crate::imaging::{Dimensions, ExifMetadata};
use crate::record::ImageRecord;
use serde::Serialize;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Upscale
// ============================================================================

pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Processing { index, total, file } => {
            vec![format!("{}/{} {}", format_index(*index), format_index(*total), file)]
        }
        BatchEvent::Done { width, height, .. } => {
            vec![format!("{}→ {}x{}", indent(1), width, height)]
        }
        BatchEvent::Failed { reason, .. } => vec![format!("{}✗ {}", indent(1), reason)],
    }
}

pub fn format_batch_summary(summary: &BatchSummary) -> Vec<String> {
    let mut line = format!("Upscaled {}", plural(summary.processed, "image"));
    if summary.failed > 0 {
        line.push_str(&format!(", {} failed", summary.failed));
    }
    line.push_str(&format!(" → {}", summary.output_dir.display()));
    vec![String::new(), line]
}

pub fn print_batch_summary(summary: &BatchSummary) {
    for line in format_batch_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Info
// ============================================================================

/// Everything `pix info` reports about one file; also the `--json` shape.
#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub path: String,
    pub dimensions: Dimensions,
    pub frames: usize,
    /// Delay of the first frame; only present for animations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_delay_ms: Option<u32>,
    pub exif: ExifMetadata,
}

impl ImageInfo {
    pub fn from_record(record: &ImageRecord) -> Self {
        Self {
            path: record.path().display().to_string(),
            dimensions: record.dimensions(),
            frames: record.frame_count(),
            frame_delay_ms: record.is_animated().then(|| record.frame_delay_ms()),
            exif: record.exif().clone(),
        }
    }
}

fn exif_lines(exif: &ExifMetadata) -> Vec<String> {
    if !exif.present {
        return vec![format!("{}EXIF: none", indent(1))];
    }
    let fields = [
        ("Camera", exif.camera.as_deref(), ""),
        ("Date", exif.date_time.as_deref(), ""),
        ("Exposure", exif.exposure.as_deref(), " s"),
        ("Aperture", exif.aperture.as_deref(), ""),
        ("ISO", exif.iso.as_deref(), ""),
        ("Focal length", exif.focal_length.as_deref(), ""),
    ];
    fields
        .iter()
        .filter_map(|(label, value, unit)| {
            value.map(|v| format!("{}{}: {}{}", indent(1), label, v, unit))
        })
        .collect()
}

pub fn format_info(info: &ImageInfo) -> Vec<String> {
    let mut lines = vec![
        info.path.clone(),
        format!("{}Size: {}", indent(1), info.dimensions),
    ];
    if let Some(delay) = info.frame_delay_ms {
        lines.push(format!("{}Frames: {}", indent(1), info.frames));
        lines.push(format!("{}Frame delay: {} ms", indent(1), delay));
    }
    lines.extend(exif_lines(&info.exif));
    lines
}

pub fn print_info(info: &ImageInfo) {
    for line in format_info(info) {
        println!("{}", line);
    }
}
