//! # CLI Structure and Argument Parsing
//!
//! This module defines the command-line interface for `smap`. The CLI is built using
//! `clap` with derive macros for help generation and argument validation.
//!
//! ## Usage Patterns
//!
//! ```bash
//! # Generate sitemap.xml for a built site
//! smap generate --base-url https://example.com --root public
//!
//! # Settings from a file, flags override
//! smap generate --config smap.toml --txt --gzip
//!
//! # Validate existing documents
//! smap validate public/sitemap.xml public/sitemap.txt.gz --strict
//! ```
//!
//! ## Output Formats
//!
//! Both commands accept `--format text|json`; `SMAP_OUTPUT_FORMAT` sets the default.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use smap_core::SiteSettings;

use crate::output::OutputFormat;

/// Main CLI structure for the `smap` command.
#[derive(Parser, Clone, Debug)]
#[command(name = "smap")]
#[command(version)]
#[command(about = "smap - Sitemap generation and validation for static sites", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Scan a built site and write sitemap documents
    Generate(GenerateArgs),

    /// Validate existing sitemap documents
    Validate(ValidateArgs),
}

impl Commands {
    /// Output format selected for the command.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        match self {
            Self::Generate(args) => args.format.format,
            Self::Validate(args) => args.format.format,
        }
    }
}

/// Shared clap argument for commands that accept an output format.
#[derive(Args, Clone, Debug, PartialEq, Eq)]
pub struct FormatArg {
    /// Output format
    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        env = "SMAP_OUTPUT_FORMAT"
    )]
    pub format: OutputFormat,
}

/// Arguments for `smap generate`.
#[derive(Args, Clone, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct GenerateArgs {
    /// TOML settings file; flags override its values
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Public base URL of the site (http or https)
    #[arg(short = 'u', long, env = "SMAP_BASE_URL")]
    pub base_url: Option<String>,

    /// Built site directory [default: .]
    #[arg(short = 'r', long, env = "SMAP_ROOT")]
    pub root: Option<PathBuf>,

    /// Include glob, relative to the root (repeatable) [default: **/*]
    #[arg(short = 'i', long = "include", value_name = "GLOB")]
    pub include: Vec<String>,

    /// Exclude glob, relative to the root (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// URL to drop from the output; `*` and `?` are wildcards (repeatable)
    #[arg(long = "exclude-url", value_name = "PATTERN")]
    pub exclude_urls: Vec<String>,

    /// File extension never turned into a URL (repeatable)
    #[arg(long = "exclude-ext", value_name = "EXT")]
    pub exclude_extensions: Vec<String>,

    /// Extra URL to include, absolute or site-relative (repeatable)
    #[arg(short = 'a', long = "add-url", value_name = "URL")]
    pub additional_urls: Vec<String>,

    /// Lastmod strategy: git, filemtime, current or none [default: filemtime]
    #[arg(long, value_name = "STRATEGY")]
    pub lastmod: Option<String>,

    /// Change frequency for every URL
    #[arg(long, value_name = "FREQ")]
    pub changefreq: Option<String>,

    /// Priority for every URL, between 0.0 and 1.0
    #[arg(long, allow_negative_numbers = true)]
    pub priority: Option<f32>,

    /// Ignore `<link rel="canonical">` in pages
    #[arg(long)]
    pub no_canonical: bool,

    /// Follow internal links to find extra pages
    #[arg(long)]
    pub discover_links: bool,

    /// Do not write the XML sitemap
    #[arg(long)]
    pub no_xml: bool,

    /// Also write a TXT sitemap
    #[arg(long)]
    pub txt: bool,

    /// Also write gzip copies of every document
    #[arg(long)]
    pub gzip: bool,

    /// Treat protocol violations as errors
    #[arg(long)]
    pub strict: bool,

    /// Output directory [default: the root]
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// XML sitemap file name [default: sitemap.xml]
    #[arg(long, value_name = "NAME")]
    pub xml_name: Option<String>,

    /// TXT sitemap file name [default: sitemap.txt]
    #[arg(long, value_name = "NAME")]
    pub txt_name: Option<String>,

    /// Sitemap index file name [default: sitemap-index.xml]
    #[arg(long, value_name = "NAME")]
    pub index_name: Option<String>,

    /// Maximum URLs per sitemap file [default: 50000]
    #[arg(long, value_name = "N")]
    pub max_per_file: Option<usize>,

    /// Maximum pages added through link discovery [default: 1000]
    #[arg(long, value_name = "N")]
    pub max_discovered: Option<usize>,

    /// Total after which discovered pages are no longer added [default: 100000]
    #[arg(long, value_name = "N")]
    pub max_total: Option<usize>,

    /// Maximum entries a validated document may hold [default: 50000]
    #[arg(long, value_name = "N")]
    pub max_validate_entries: Option<usize>,

    /// Existing document to validate after generation (repeatable)
    #[arg(long = "validate", value_name = "FILE")]
    pub validate: Vec<PathBuf>,

    #[command(flatten)]
    pub format: FormatArg,
}

const fn flag(set: bool, value: bool) -> Option<bool> {
    if set { Some(value) } else { None }
}

impl GenerateArgs {
    /// Settings expressed by the flags alone.
    #[must_use]
    pub fn to_settings(&self) -> SiteSettings {
        SiteSettings {
            base_url: self.base_url.clone(),
            root: self.root.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            exclude_urls: self.exclude_urls.clone(),
            exclude_extensions: self.exclude_extensions.clone(),
            additional_urls: self.additional_urls.clone(),
            lastmod: self.lastmod.clone(),
            changefreq: self.changefreq.clone(),
            priority: self.priority,
            canonical: flag(self.no_canonical, false),
            discover_links: flag(self.discover_links, true),
            xml: flag(self.no_xml, false),
            txt: flag(self.txt, true),
            gzip: flag(self.gzip, true),
            strict: flag(self.strict, true),
            output_dir: self.output_dir.clone(),
            xml_name: self.xml_name.clone(),
            txt_name: self.txt_name.clone(),
            index_name: self.index_name.clone(),
            max_per_file: self.max_per_file,
            max_discovered: self.max_discovered,
            max_total: self.max_total,
            max_validate_entries: self.max_validate_entries,
            validate: self.validate.clone(),
        }
    }
}

/// Arguments for `smap validate`.
#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Documents to validate (.xml, .txt, optionally .gz)
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Treat protocol violations as errors
    #[arg(long)]
    pub strict: bool,

    /// Maximum entries per document [default: 50000]
    #[arg(long, value_name = "N")]
    pub max_entries: Option<usize>,

    #[command(flatten)]
    pub format: FormatArg,
}
