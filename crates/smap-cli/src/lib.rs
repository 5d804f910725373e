//! smap CLI - sitemap generation and validation for static sites
//!
//! The binary in `main.rs` only maps the result of [`run`] to an exit code;
//! parsing, logging setup and dispatch live here so integration tests and other
//! front ends can drive the same code path.

use std::panic::PanicHookInfo;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

mod cli;
mod commands;
pub mod error;
mod output;
mod utils;

use cli::{Cli, Commands};
use utils::logging::initialize_logging;

/// Execute the smap CLI with the current process arguments.
///
/// # Errors
///
/// Returns an error (usually a [`error::CliError`]) when logging cannot be set up,
/// the settings are invalid, an artifact cannot be written or validation fails.
pub async fn run() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        match panic_report(info) {
            Some(report) => eprintln!("{} {report}", "error:".red().bold()),
            None => std::process::exit(0),
        }
    }));

    let cli = Cli::parse();
    initialize_logging(&cli)?;

    match &cli.command {
        Commands::Generate(args) => commands::generate(args, cli.verbose).await,
        Commands::Validate(args) => commands::validate(args).await,
    }
}

/// One-line report for a panic, or `None` when stdout was closed under us.
fn panic_report(info: &PanicHookInfo<'_>) -> Option<String> {
    let payload = info.payload();
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause");
    format_panic(message, info.location().map(ToString::to_string))
}

fn format_panic(message: &str, location: Option<String>) -> Option<String> {
    if message.to_ascii_lowercase().contains("broken pipe") {
        return None;
    }
    let message = message.lines().next().unwrap_or_default();
    Some(match location {
        Some(location) => format!("{}: {message} (at {location})", error::ErrorCategory::Internal),
        None => format!("{}: {message}", error::ErrorCategory::Internal),
    })
}
