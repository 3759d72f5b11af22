//! Command Line Interface (CLI) layer for the `sentinelhub` binary.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) that turns subcommands into layer
//! calls. Results are printed as JSON.
//!
//! If you are embedding the client into another application, prefer the
//! library API (`sentinelhub::api`, `sentinelhub::layer`) over the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
