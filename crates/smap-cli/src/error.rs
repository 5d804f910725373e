//! CLI error handling with semantic exit codes.
//!
//! Failures are categorized so CI pipelines can tell a bad invocation from a
//! sitemap that did not pass validation.
//!
//! # Exit Code Categories
//!
//! | Code | Category | Description |
//! |------|----------|-------------|
//! | 0 | Success | Command completed successfully |
//! | 1 | `Internal` | Unexpected/internal error |
//! | 2 | `Usage` | Invalid arguments or configuration |
//! | 3 | `Validation` | A document failed validation |
//! | 4 | `Artifact` | A sitemap file could not be written |
//!
//! # Usage
//!
//! ```bash
//! smap generate -u https://example.com -r public --strict
//! case $? in
//!     0) echo "Sitemap written and valid" ;;
//!     3) echo "Sitemap written but invalid" ;;
//!     *) echo "Other error" ;;
//! esac
//! ```

use std::fmt;

/// Semantic error category determining the exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Unexpected or internal error (exit code 1).
    Internal = 1,

    /// Invalid arguments or configuration (exit code 2).
    ///
    /// Nothing has been written when this is returned.
    Usage = 2,

    /// At least one validated document has errors (exit code 3).
    Validation = 3,

    /// Writing a sitemap artifact failed (exit code 4).
    Artifact = 4,
}

impl ErrorCategory {
    /// Get the exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }

    /// Get a short description of this error category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Internal => "internal error",
            Self::Usage => "usage error",
            Self::Validation => "validation failed",
            Self::Artifact => "write failed",
        }
    }

    /// Category for an error raised by `smap-core`.
    #[must_use]
    pub const fn from_core(err: &smap_core::Error) -> Self {
        match err {
            smap_core::Error::Config(_) | smap_core::Error::InvalidConfig { .. } => Self::Usage,
            smap_core::Error::Artifact { .. } => Self::Artifact,
            _ => Self::Internal,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A CLI error with a semantic category for exit code mapping.
///
/// Wraps an `anyhow::Error` so the full context chain survives while the
/// category decides the exit code.
#[derive(Debug)]
pub struct CliError {
    /// The semantic category of this error.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    /// Create a new CLI error with explicit category.
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Internal, source)
    }

    /// Create a validation error.
    pub fn validation(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Validation, source)
    }

    /// Create an artifact write error.
    pub fn artifact(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Artifact, source)
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.category.exit_code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl From<smap_core::Error> for CliError {
    fn from(err: smap_core::Error) -> Self {
        Self::new(ErrorCategory::from_core(&err), err)
    }
}

/// Determine the exit code from an `anyhow::Error`.
///
/// `CliError` carries its own category; a bare `smap_core::Error` is mapped by
/// variant; anything else is internal.
#[must_use]
pub fn exit_code_from_error(err: &anyhow::Error) -> u8 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    if let Some(core_err) = err.downcast_ref::<smap_core::Error>() {
        return ErrorCategory::from_core(core_err).exit_code();
    }
    ErrorCategory::Internal.exit_code()
}
