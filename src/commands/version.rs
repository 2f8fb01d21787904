//! # Version Command Implementation
//!
//! Prints the crate version, the commit it was built from and the platform.
//! The commit comes from the `CAREEN_BUILD` environment variable at compile
//! time and reads `unknown` when it was not set.

use anyhow::Result;

/// Commit hash baked in at build time.
pub const BUILD: &str = match option_env!("CAREEN_BUILD") {
    Some(build) => build,
    None => "unknown",
};

/// Formats the version report.
pub fn report() -> String {
    format!(
        "careen {}\nbuild: {}\nplatform: {}/{}",
        env!("CARGO_PKG_VERSION"),
        BUILD,
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    println!("{}", report());
    Ok(())
}
