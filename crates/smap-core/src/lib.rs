//! # smap-core
//!
//! Core functionality for smap - sitemap generation and validation for built static sites.
//!
//! This crate walks a site directory, assembles a deduplicated and sorted list of page
//! URLs, renders it as sitemap protocol 0.9 documents (XML, TXT, gzip and an index when
//! the list is split) and validates the result, or any document supplied from elsewhere,
//! with tolerant pattern-based checks.
//!
//! ## Architecture
//!
//! The crate is organized as a pipeline, leaves first:
//!
//! - **Normalization**: base URL plus relative or filesystem path to absolute URL
//! - **Walking**: glob-filtered traversal of the content root
//! - **Discovery**: canonical links and internal anchors from HTML pages
//! - **Timestamps**: per-item `lastmod` from git, mtime or the generation instant
//! - **Collection**: merge, dedup, URL exclusion, caps and sorting
//! - **Chunking and rendering**: bounded files, XML/TXT/index text, gzip
//! - **Emission**: concurrent per-type writes followed by validation
//! - **Validation**: strict or lenient findings for any sitemap document
//!
//! ## Quick Start
//!
//! ```no_run
//! use smap_core::{SiteSettings, pipeline};
//!
//! # async fn example() -> smap_core::Result<()> {
//! let settings = SiteSettings {
//!     base_url: Some("https://example.com/".to_string()),
//!     root: Some("public".into()),
//!     ..SiteSettings::default()
//! };
//! let (config, warnings) = settings.validate()?;
//! let summary = pipeline::run(config, warnings).await?;
//! println!("{} URLs in {} chunk(s)", summary.items, summary.chunks);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Configuration problems are reported together before anything is written. Per-page
//! read failures and reached caps never abort a run; artifact write failures are scoped
//! to their artifact type and surface in the [`RunSummary`].

/// Chunking of the collection into sitemap files
pub mod chunk;
/// Merge, dedup and exclusion of candidate items
pub mod collect;
/// Raw settings and the validated run configuration
pub mod config;
/// Canonical resolution and link discovery
pub mod discover;
/// Artifact writing, compression and re-validation
pub mod emit;
/// Error types and result aliases
pub mod error;
/// Modification timestamp strategies
pub mod lastmod;
/// URL normalization
pub mod normalize;
/// End-to-end generation run
pub mod pipeline;
/// Document rendering
pub mod render;
/// Core data types
pub mod types;
/// Tolerant document validation
pub mod validate;
/// Site directory traversal
pub mod walker;

// Re-export commonly used types
pub use config::{Features, Limits, OutputConfig, SiteConfig, SiteSettings};
pub use error::{Error, Result};
pub use pipeline::RunSummary;
pub use types::*;
pub use validate::{BatchReport, DocumentKind, FileReport, Finding, Severity, ValidationPolicy};
