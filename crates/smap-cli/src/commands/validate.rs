//! Validate command - check existing sitemap documents

use anyhow::{Result, anyhow};
use smap_core::ValidationPolicy;
use smap_core::validate::validate_files;

use crate::cli::ValidateArgs;
use crate::error::CliError;
use crate::output::{JsonFormatter, OutputFormat, TextFormatter};

/// Policy for the given flags.
#[must_use]
pub fn policy(args: &ValidateArgs) -> ValidationPolicy {
    let mut policy = ValidationPolicy {
        strict: args.strict,
        ..ValidationPolicy::default()
    };
    if let Some(max) = args.max_entries {
        policy.max_entries = max;
    }
    policy
}

/// Execute `smap validate`.
///
/// # Errors
///
/// Returns a validation error when any document has error findings.
pub async fn execute(args: &ValidateArgs) -> Result<()> {
    let policy = policy(args);
    let files = args.files.clone();
    let batch = match tokio::task::spawn_blocking(move || validate_files(&files, &policy)).await {
        Ok(batch) => batch,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => return Err(CliError::internal(e).into()),
    };

    match args.format.format {
        OutputFormat::Json => JsonFormatter::format_batch(&batch)?,
        OutputFormat::Text => TextFormatter::format_batch(&batch),
    }

    if batch.passed {
        Ok(())
    } else {
        Err(CliError::validation(anyhow!(
            "{} error(s) in {} file(s)",
            batch.error_count,
            batch.files.iter().filter(|file| !file.passed()).count()
        ))
        .into())
    }
}
