//! Error types and handling for smap-core operations.
//!
//! Errors are categorized by the phase that produced them so callers can decide
//! whether a failure aborts the whole run or only a single artifact.
//!
//! ## Error Categories
//!
//! - **Configuration**: invalid settings, reported before anything is written
//! - **Discovery**: per-file read or parse failures while walking the site
//! - **Limits**: discovery, total-item or size caps that were reached
//! - **Artifacts**: failures writing or compressing a single output document
//! - **I/O**: everything else touching the filesystem
//!
//! ## Fatality
//!
//! ```rust
//! use smap_core::Error;
//!
//! let err = Error::InvalidConfig {
//!     problems: vec!["base URL must start with http:// or https://".to_string()],
//! };
//! assert!(err.is_fatal());
//! assert_eq!(err.category(), "config");
//!
//! let capped = Error::LimitExceeded("discovery cap of 10 reached".to_string());
//! assert!(!capped.is_fatal());
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for smap-core operations.
///
/// All fallible public functions return `Result<T, Error>`. The variants mirror the
/// error taxonomy of a generation run: configuration problems abort before any
/// write, discovery problems skip a single candidate, limits only warn, and
/// artifact failures are scoped to one output document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// The underlying `std::io::Error` is preserved for detailed diagnostics.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A single configuration value or file could not be used.
    ///
    /// Used for failures reading or parsing a settings file.
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more settings failed validation.
    ///
    /// Validation collects every problem in a single pass so the user sees all of
    /// them at once instead of fixing one per run.
    #[error("Invalid configuration: {}", problems.join("; "))]
    InvalidConfig {
        /// Every problem found during validation, in field order.
        problems: Vec<String>,
    },

    /// Reading or parsing a discovery candidate failed.
    ///
    /// Never aborts a run: the candidate is skipped and the walk continues.
    #[error("Discovery error for {path}: {reason}")]
    Discovery {
        /// File that could not be read or parsed.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// A discovery, total-item or size cap was reached.
    ///
    /// Surfaced as a warning; processing continues with the cap enforced.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    /// A document could not be rendered or compressed.
    #[error("Render error: {0}")]
    Render(String),

    /// Writing a specific output artifact failed.
    ///
    /// Fatal for that artifact only; other artifact types are still attempted.
    #[error("Failed to write {}: {source}", path.display())]
    Artifact {
        /// Destination of the artifact that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<globset::Error> for Error {
    fn from(err: globset::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl Error {
    /// Whether this error should abort the whole run.
    ///
    /// Discovery failures and reached limits only skip a candidate or stop adding; artifact
    /// failures are reported per artifact and do not stop the others.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::Discovery { .. } | Self::LimitExceeded(_) | Self::Artifact { .. } => false,
            Self::Io(_)
            | Self::Config(_)
            | Self::InvalidConfig { .. }
            | Self::Render(_)
            | Self::Other(_) => true,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// - `"io"` - File system and I/O operations
    /// - `"config"` - Settings files and validation
    /// - `"discovery"` - Per-candidate walk and parse failures
    /// - `"limit"` - Reached caps
    /// - `"render"` - Document rendering and compression
    /// - `"artifact"` - Writing a single output document
    /// - `"other"` - Uncategorized errors
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Config(_) | Self::InvalidConfig { .. } => "config",
            Self::Discovery { .. } => "discovery",
            Self::LimitExceeded(_) => "limit",
            Self::Render(_) => "render",
            Self::Artifact { .. } => "artifact",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
