//! Generate command - scan a built site and write sitemap documents

use anyhow::{Result, anyhow};
use smap_core::{RunSummary, SiteSettings, pipeline};
use tracing::debug;

use crate::cli::GenerateArgs;
use crate::error::CliError;
use crate::output::{JsonFormatter, OutputFormat, TextFormatter};

/// Settings from `--config` (if any) with the flags layered on top.
///
/// # Errors
///
/// Returns a usage error when the settings file cannot be read or parsed.
pub fn load_settings(args: &GenerateArgs) -> Result<SiteSettings> {
    let flags = args.to_settings();
    let Some(path) = &args.config else {
        return Ok(flags);
    };
    debug!("loading settings from {}", path.display());
    let file = SiteSettings::from_toml_file(path).map_err(CliError::from)?;
    Ok(file.merge(flags))
}

/// Execute `smap generate`.
///
/// # Errors
///
/// Usage errors for bad settings (nothing is written), artifact errors when a
/// document could not be written, validation errors when a written or listed
/// document has errors.
pub async fn execute(args: &GenerateArgs, verbose: bool) -> Result<()> {
    let (config, warnings) = load_settings(args)?.validate().map_err(CliError::from)?;
    let summary = pipeline::run(config, warnings).await.map_err(CliError::from)?;

    match args.format.format {
        OutputFormat::Json => JsonFormatter::format_summary(&summary)?,
        OutputFormat::Text => TextFormatter::format_summary(&summary, verbose),
    }

    outcome(&summary)
}

/// Exit status for a finished run.
fn outcome(summary: &RunSummary) -> Result<()> {
    if summary.write_failed() {
        let failed: Vec<String> = summary
            .artifacts
            .iter()
            .filter(|artifact| !artifact.succeeded())
            .map(|artifact| artifact.kind.to_string())
            .collect();
        return Err(CliError::artifact(anyhow!(
            "could not write the {} sitemap",
            failed.join(", ")
        ))
        .into());
    }
    if summary.validation_failed() {
        return Err(CliError::validation(anyhow!("sitemap validation reported errors")).into());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn generate_args(args: &[&str]) -> GenerateArgs {
        let mut full = vec!["smap", "generate"];
        full.extend_from_slice(args);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Generate(args) => args,
            Commands::Validate(_) => panic!("expected generate"),
        }
    }

    #[test]
    fn test_flags_override_settings_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("smap.toml");
        fs::write(
            &path,
            "base-url = \"https://file.example.com\"\ntxt = true\npriority = 0.3\n",
        )
        .unwrap();

        let args = generate_args(&[
            "--config",
            path.to_str().unwrap(),
            "--base-url",
            "https://flag.example.com",
        ]);
        let settings = load_settings(&args).unwrap();
        assert_eq!(settings.base_url.as_deref(), Some("https://flag.example.com"));
        assert_eq!(settings.txt, Some(true));
        assert_eq!(settings.priority, Some(0.3));
    }

    #[test]
    fn test_missing_settings_file_is_usage_error() {
        let args = generate_args(&["--config", "/nonexistent/smap.toml"]);
        let err = load_settings(&args).unwrap_err();
        assert_eq!(crate::error::exit_code_from_error(&err), 2);
    }
}
