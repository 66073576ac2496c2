//! Unattended bulk upscaling.
//!
//! `pix upscale <folder>` runs every image directly inside `folder` through
//! load → Lanczos-3 upscale → encode, writing results next to the inputs:
//!
//! ```text
//! photos/
//! ├── a.jpg
//! ├── b.png
//! ├── notes.txt          # ignored: not an image
//! ├── nested/            # ignored: not recursive
//! └── upscaled/          # created
//!     ├── a.jpg          # same name, same format
//!     └── b.png
//! ```
//!
//! Files are handled one at a time in name order; each upscale fans its rows
//! out over the `rayon` pool. A failing file is reported and skipped, it
//! never stops the run. Progress is streamed as [`BatchEvent`]s over an
//! optional channel so the caller decides how to display it.

use crate::config::EngineConfig;
use crate::imaging::{ImageCodec, RustCodec};
use crate::record::ImageRecord;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions picked up by the batch run (compared case-insensitively).
pub const INPUT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot list folder: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("Scale must be at least 1, got {0}")]
    InvalidScale(u32),
}

/// Progress of a batch run, one or two events per input file.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Processing {
        index: usize,
        total: usize,
        file: String,
    },
    Done {
        file: String,
        width: u32,
        height: u32,
    },
    Failed {
        file: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    pub output_dir: PathBuf,
}

fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| INPUT_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// Image files directly inside `folder`, sorted by file name.
pub fn find_inputs(folder: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !folder.is_dir() {
        return Err(BatchError::NotADirectory(folder.to_path_buf()));
    }
    let mut inputs = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() && has_input_extension(entry.path()) {
            inputs.push(entry.into_path());
        }
    }
    Ok(inputs)
}

/// Upscale every image in `folder` by `scale` with the pure Rust codec.
pub fn upscale_folder(
    folder: &Path,
    scale: u32,
    config: &EngineConfig,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    upscale_folder_with_codec(&RustCodec::new(), folder, scale, config, events)
}

/// Upscale using a specific codec (allows testing with mock).
pub fn upscale_folder_with_codec(
    codec: &impl ImageCodec,
    folder: &Path,
    scale: u32,
    config: &EngineConfig,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    if scale == 0 {
        return Err(BatchError::InvalidScale(scale));
    }
    let inputs = find_inputs(folder)?;
    let output_dir = folder.join(&config.batch.output_dir);
    std::fs::create_dir_all(&output_dir)?;
    tracing::info!(
        "Upscaling {} image(s) x{} into {}",
        inputs.len(),
        scale,
        output_dir.display()
    );

    let emit = |event: BatchEvent| {
        if let Some(tx) = &events {
            // a closed receiver only means nobody is watching
            let _ = tx.send(event);
        }
    };

    let mut summary = BatchSummary {
        processed: 0,
        failed: 0,
        output_dir: output_dir.clone(),
    };
    for (index, input) in inputs.iter().enumerate() {
        let file = input
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        emit(BatchEvent::Processing {
            index: index + 1,
            total: inputs.len(),
            file: file.clone(),
        });

        match upscale_one(codec, input, &output_dir.join(&file), scale, config) {
            Ok((width, height)) => {
                summary.processed += 1;
                emit(BatchEvent::Done {
                    file,
                    width,
                    height,
                });
            }
            Err(reason) => {
                tracing::warn!("{}: {}", input.display(), reason);
                summary.failed += 1;
                emit(BatchEvent::Failed { file, reason });
            }
        }
    }
    Ok(summary)
}

fn upscale_one(
    codec: &impl ImageCodec,
    input: &Path,
    output: &Path,
    scale: u32,
    config: &EngineConfig,
) -> Result<(u32, u32), String> {
    let mut record = ImageRecord::load(input, codec).map_err(|e| e.to_string())?;
    let dims = record
        .upscale_lanczos(scale, &config.limits)
        .map_err(|e| e.to_string())?
        .unwrap_or_else(|| record.dimensions());
    record.save(output, codec).map_err(|e| e.to_string())?;
    Ok((dims.width, dims.height))
}
