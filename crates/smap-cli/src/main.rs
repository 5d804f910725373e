//! smap - sitemap generation and validation for static sites
//!
//! Entry point for the `smap` binary. Errors are printed once to stderr and
//! mapped to the exit codes documented in `smap_cli::error`. A panic is
//! reported by the hook installed in `run` and exits as an internal error.

use std::process::ExitCode;

use colored::Colorize;
use smap_cli::error::{ErrorCategory, exit_code_from_error};

#[tokio::main]
async fn main() -> ExitCode {
    match tokio::spawn(smap_cli::run()).await {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(err)) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::from(exit_code_from_error(&err))
        },
        Err(_) => ExitCode::from(ErrorCategory::Internal.exit_code()),
    }
}
