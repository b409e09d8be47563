//! Command Line Interface (CLI) layer for fixelevs.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`): load the config file, apply
//! command-line overrides, and run the batch through `fixelevs::api`.
//!
//! If you are embedding fixelevs into another application, prefer using
//! the high-level `fixelevs::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
