use clap::Parser;
use std::path::PathBuf;

use dbraster::{OutputFormat, Precision};

#[derive(Parser, Debug)]
#[command(name = "dbraster", version, about = "Decibel raster pipeline CLI")]
pub struct CliArgs {
    /// Output image path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (tiff or jpeg)
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::JPEG)]
    pub format: OutputFormat,

    /// JSON file with pipeline parameters; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Raster width in samples
    #[arg(long)]
    pub width: Option<usize>,

    /// Raster height in samples
    #[arg(long)]
    pub height: Option<usize>,

    /// Seed for the synthetic source
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log-domain values strictly below this are rescaled (must be > 0)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Factor applied to values below the threshold
    #[arg(long, allow_negative_numbers = true)]
    pub multiplier: Option<f64>,

    /// Working precision (f32 or f64)
    #[arg(long, value_enum)]
    pub precision: Option<Precision>,

    /// Do not write the JSON metadata sidecar
    #[arg(long, default_value_t = false)]
    pub no_metadata: bool,

    /// Print the memory estimate as JSON and exit without processing
    #[arg(long, default_value_t = false)]
    pub estimate_only: bool,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
