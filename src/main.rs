//! framequant: turn a directory of numbered PNG frames into one animated GIF.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use framequant::{ConvertConfig, MAX_PALETTE_COLORS};

#[derive(Debug, Parser)]
#[command(name = "framequant", version, about)]
struct Args {
    /// Directory containing frames named 0.png, 1.png, ...
    input_dir: PathBuf,

    /// Ignore frames numbered below this
    #[arg(short = 's', long, default_value_t = 0)]
    min_index: u64,

    /// Nominal frame rate of the input sequence
    #[arg(short, long, default_value_t = 24)]
    fps: u32,

    /// Palette size (1-255)
    #[arg(short, long, default_value_t = MAX_PALETTE_COLORS as u32)]
    colors: u32,

    /// Store every frame in full instead of only the changed pixels
    #[arg(long)]
    no_transparency: bool,

    /// Keep full-canvas frames (no bounding-box crop, no dropped duplicates)
    #[arg(long)]
    no_crop: bool,

    /// Output file [default: <input dir name>.gif]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log per-frame detail
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn to_config(&self) -> ConvertConfig {
        let mut config = ConvertConfig::new()
            .input_dir(&self.input_dir)
            .min_index(self.min_index)
            .fps(self.fps)
            .max_colors(self.colors)
            .transparency(!self.no_transparency)
            .crop(!self.no_crop);
        if let Some(output) = &self.output {
            config = config.output(output);
        }
        config
    }
}

fn init_logging(verbose: bool) {
    let directive = if verbose {
        "framequant=debug"
    } else {
        "framequant=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match framequant::convert(&args.to_config()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            let mut message = e.to_string();
            let mut source = e.source();
            while let Some(cause) = source {
                message.push_str(": ");
                message.push_str(&cause.to_string());
                source = cause.source();
            }
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}
