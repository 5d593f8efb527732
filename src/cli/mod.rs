//! Command Line Interface (CLI) layer for dbraster.
//!
//! `args` defines argument parsing, `errors` the CLI error type, and `runner`
//! wires parameters (config file plus flag overrides) to the library's
//! `process_to_path`. Embedders should call `dbraster::api` directly.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
