//! # careen CLI
//!
//! This is the binary entry point for the `careen` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments and `CAREEN_*` environment variables
//!   using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Turning any error into a message on stderr and exit status 1.
//!
//! The synchronization and patch pipeline lives in the `careen` library
//! crate; the binary only resolves settings and reports results.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
