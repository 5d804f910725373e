//! Tolerant sitemap validation.
//!
//! The validator inspects document text with patterns instead of a conforming
//! XML parser, so malformed input from elsewhere never aborts a run; it only
//! produces findings. The same checks apply to freshly generated artifacts and
//! to files handed in by the user.
//!
//! ## Policy
//!
//! Each protocol violation becomes an error under the strict policy and a
//! warning under the lenient one. Validation always completes and reports every
//! finding.
//!
//! ```rust
//! use smap_core::validate::{check_document, DocumentKind, Severity, ValidationPolicy};
//!
//! let policy = ValidationPolicy { strict: true, ..ValidationPolicy::default() };
//! let findings = check_document("ftp://bad.example.com\n", DocumentKind::Txt, &policy);
//! assert!(findings.iter().any(|f| f.severity == Severity::Error));
//! ```

mod checks;
pub mod detect;

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::Serialize;
use tracing::{debug, instrument};

pub use checks::check_document;
pub use detect::detect;

use crate::config::{Limits, MAX_URL_LENGTH, PROTOCOL_MAX_BYTES, PROTOCOL_MAX_URLS};

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A section passed.
    Info,
    /// A violation under the lenient policy.
    Warning,
    /// A violation under the strict policy, or an unreadable file.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// One validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// How serious the finding is.
    pub severity: Severity,
    /// Human-readable message, prefixed with its section.
    pub message: String,
}

impl Finding {
    /// Informational finding.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    /// Warning finding.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// Error finding.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Kind of sitemap document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// `<urlset>` document.
    Xml,
    /// Plain-text URL list.
    Txt,
    /// `<sitemapindex>` document.
    Index,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Xml => "xml",
            Self::Txt => "txt",
            Self::Index => "index",
        })
    }
}

/// Policy and limits applied by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Violations are errors rather than warnings.
    pub strict: bool,
    /// Maximum entries per document.
    pub max_entries: usize,
    /// Maximum uncompressed document size.
    pub max_bytes: u64,
    /// Location values must be shorter than this many characters.
    pub max_url_length: usize,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            strict: false,
            max_entries: PROTOCOL_MAX_URLS,
            max_bytes: PROTOCOL_MAX_BYTES,
            max_url_length: MAX_URL_LENGTH,
        }
    }
}

impl ValidationPolicy {
    /// Policy derived from run limits.
    #[must_use]
    pub const fn from_limits(limits: &Limits, strict: bool) -> Self {
        Self {
            strict,
            max_entries: limits.max_entries,
            max_bytes: limits.max_document_bytes,
            max_url_length: limits.max_url_length,
        }
    }
}

/// Findings for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    /// Path that was validated.
    pub path: PathBuf,
    /// Whether the file existed.
    pub exists: bool,
    /// Detected kind, absent when the file could not be read.
    pub kind: Option<DocumentKind>,
    /// Size on disk in bytes.
    pub size: u64,
    /// Findings in check order.
    pub findings: Vec<Finding>,
}

impl FileReport {
    /// Number of error findings.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Number of warning findings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Whether the file raised no errors.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error_count() == 0
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|finding| finding.severity == severity)
            .count()
    }

    fn unreadable(path: &Path, exists: bool, size: u64, message: String) -> Self {
        Self {
            path: path.to_path_buf(),
            exists,
            kind: None,
            size,
            findings: vec![Finding::error(message)],
        }
    }
}

/// Rollup across several files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Per-file reports in input order.
    pub files: Vec<FileReport>,
    /// True when no file raised an error.
    pub passed: bool,
    /// Total errors.
    pub error_count: usize,
    /// Total warnings.
    pub warning_count: usize,
}

impl BatchReport {
    /// Aggregate per-file reports.
    #[must_use]
    pub fn from_reports(files: Vec<FileReport>) -> Self {
        let error_count = files.iter().map(FileReport::error_count).sum();
        let warning_count = files.iter().map(FileReport::warning_count).sum();
        Self {
            files,
            passed: error_count == 0,
            error_count,
            warning_count,
        }
    }
}

/// Validate in-memory content of a known kind.
#[must_use]
pub fn validate_content(
    path: &Path,
    content: &str,
    kind: DocumentKind,
    policy: &ValidationPolicy,
) -> FileReport {
    FileReport {
        path: path.to_path_buf(),
        exists: true,
        kind: Some(kind),
        size: content.len() as u64,
        findings: check_document(content, kind, policy),
    }
}

/// Read, decompress if needed, detect and validate one file.
#[instrument(skip(policy), fields(path = %path.display()))]
pub fn validate_file(path: &Path, policy: &ValidationPolicy) -> FileReport {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return FileReport::unreadable(path, false, 0, "file does not exist".to_string());
        },
        Err(e) => {
            return FileReport::unreadable(path, path.exists(), 0, format!("could not read file: {e}"));
        },
    };
    let size = bytes.len() as u64;

    let raw = if detect::is_gzip(path, &bytes) {
        let mut decoded = Vec::new();
        let limit = policy.max_bytes.saturating_add(1);
        if let Err(e) = GzDecoder::new(bytes.as_slice())
            .take(limit)
            .read_to_end(&mut decoded)
        {
            return FileReport::unreadable(path, true, size, format!("could not decompress: {e}"));
        }
        decoded
    } else {
        bytes
    };

    let (content, utf8_error) = match String::from_utf8(raw) {
        Ok(text) => (text, None),
        Err(e) => {
            let lossy = String::from_utf8_lossy(e.as_bytes()).into_owned();
            (lossy, Some(e.utf8_error()))
        },
    };

    let kind = detect(path, &content);
    debug!(%kind, size, "Validating document");

    let mut findings = Vec::new();
    if let Some(e) = utf8_error {
        let message = format!("encoding: document is not valid UTF-8 ({e})");
        findings.push(if policy.strict {
            Finding::error(message)
        } else {
            Finding::warning(message)
        });
    }
    findings.extend(check_document(&content, kind, policy));

    FileReport {
        path: path.to_path_buf(),
        exists: true,
        kind: Some(kind),
        size,
        findings,
    }
}

/// Validate several files independently.
#[must_use]
pub fn validate_files(paths: &[PathBuf], policy: &ValidationPolicy) -> BatchReport {
    BatchReport::from_reports(paths.iter().map(|path| validate_file(path, policy)).collect())
}
