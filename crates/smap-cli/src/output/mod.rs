//! # Output Formatting
//!
//! Both commands print either a colored text summary for people or a single JSON
//! document for scripts. Logs always go to stderr, so stdout only ever carries the
//! selected format.
//!
//! ```bash
//! smap generate -u https://example.com -r public --format json | jq '.items'
//! smap validate public/sitemap.xml -f json | jq '.passed'
//! ```

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

/// Output format for command results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable text (default)
    Text,
    /// Single JSON document
    Json,
}
