use clap::{Parser, Subcommand};
use pix::{batch, config, logging, output};
use pix::imaging::RustCodec;
use pix::record::ImageRecord;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pix")]
#[command(about = "Image transform & metadata engine: batch upscaling and EXIF inspection")]
#[command(long_about = "\
Image transform & metadata engine: batch upscaling and EXIF inspection

Upscale every JPEG, PNG and BMP directly inside a folder with Lanczos-3:

  photos/
  ├── a.jpg
  ├── b.png
  └── upscaled/          # created by `pix upscale photos`
      ├── a.jpg
      └── b.png

Settings come from ./pix.toml (or --config). Run 'pix gen-config' to
generate a documented pix.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./pix.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upscale every image in a folder into <folder>/upscaled
    Upscale {
        /// Folder holding the source images
        folder: PathBuf,
        /// Integer scale factor (default from config, 2)
        #[arg(long, short)]
        scale: Option<u32>,
    },
    /// Show dimensions, frames and EXIF metadata of one image
    Info {
        file: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock pix.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    match cli.command {
        Command::Upscale { folder, scale } => {
            let engine_config = config::load_config(cli.config.as_deref(), &std::env::current_dir()?)?;
            init_thread_pool(&engine_config.processing);
            let scale = scale.unwrap_or(engine_config.batch.scale);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = batch::upscale_folder(&folder, scale, &engine_config, Some(tx));
            printer.join().map_err(|_| "output thread panicked")?;
            let summary = result?;
            output::print_batch_summary(&summary);
            if summary.failed > 0 {
                return Err(format!("{} file(s) failed", summary.failed).into());
            }
        }
        Command::Info { file, json } => {
            let record = ImageRecord::load(&file, &RustCodec::new())?;
            let info = output::ImageInfo::from_record(&record);
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                output::print_info(&info);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    tracing::debug!("Using {} worker thread(s)", threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
