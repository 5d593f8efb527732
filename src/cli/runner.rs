use std::fs;
use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use dbraster::{PipelineParams, TracingObserver, estimate, process_to_path};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_params(path: Option<&Path>) -> Result<PipelineParams, AppError> {
    let Some(path) = path else {
        return Ok(PipelineParams::default());
    };
    let text = fs::read_to_string(path).map_err(|source| AppError::ConfigFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| AppError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Config file first, then command-line overrides.
pub fn resolve_params(args: &CliArgs) -> Result<PipelineParams, AppError> {
    let mut params = load_params(args.config.as_deref())?;
    if let Some(width) = args.width {
        params.width = width;
    }
    if let Some(height) = args.height {
        params.height = height;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    if let Some(threshold) = args.threshold {
        params.log_threshold = threshold;
    }
    if let Some(multiplier) = args.multiplier {
        params.log_multiplier = multiplier;
    }
    if let Some(precision) = args.precision {
        params.precision = precision;
    }
    Ok(params)
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.log);

    let params = resolve_params(&args)?;

    if args.estimate_only {
        let est = estimate(&params).map_err(AppError::from)?;
        println!("{}", serde_json::to_string_pretty(&est)?);
        return Ok(());
    }

    let output = args.output.clone().ok_or(AppError::MissingArgument {
        arg: "--output".to_string(),
    })?;

    info!(
        "Processing {}x{} raster (seed={}, threshold={}, multiplier={}, precision={})",
        params.width,
        params.height,
        params.seed,
        params.log_threshold,
        params.log_multiplier,
        params.precision
    );

    let written = process_to_path(
        &params,
        &output,
        args.format,
        !args.no_metadata,
        &mut TracingObserver,
    )
    .map_err(AppError::from)?;

    println!("Image saved as: {}", written.image.display());
    if let Some(sidecar) = &written.sidecar {
        println!("Metadata saved as: {}", sidecar.display());
    }
    Ok(())
}
