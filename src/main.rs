//! dbraster CLI entrypoint.
//!
//! Thin wrapper over the `cli` module: parse args, run the pipeline on a
//! seeded synthetic raster, and exit with an appropriate status.
//! For programmatic use, prefer the library API (`dbraster::api`).

use clap::Parser;

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();
    cli::run(args)
}
