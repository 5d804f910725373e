//! Core data types shared across the generation pipeline.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single page entry destined for a sitemap.
///
/// Items are created while walking and discovering, then frozen by the collector.
/// Within a collected set every `url` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteItem {
    /// Absolute `http(s)` URL of the page.
    pub url: String,
    /// Last modification time, absent under the `none` strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<DateTime<Utc>>,
    /// Change frequency hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changefreq: Option<ChangeFrequency>,
    /// Priority relative to other pages of the site (0.0 to 1.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<f32>,
}

impl SiteItem {
    /// Create an item with no metadata.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            lastmod: None,
            changefreq: None,
            priority: None,
        }
    }
}

/// Change frequency hints from the sitemap protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    /// The page changes every time it is accessed.
    Always,
    /// The page changes hourly.
    Hourly,
    /// The page changes daily.
    Daily,
    /// The page changes weekly.
    Weekly,
    /// The page changes monthly.
    Monthly,
    /// The page changes yearly.
    Yearly,
    /// The page is archived and will not change.
    Never,
}

impl ChangeFrequency {
    /// Every protocol value, in protocol order.
    pub const ALL: [Self; 7] = [
        Self::Always,
        Self::Hourly,
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Yearly,
        Self::Never,
    ];

    /// The protocol spelling of this value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChangeFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|freq| freq.as_str() == lowered)
            .ok_or_else(|| Error::Config(format!("Invalid changefreq value: {s}")))
    }
}

/// Source of the per-item `lastmod` timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LastmodStrategy {
    /// Last commit touching the file, falling back to its modification time.
    Git,
    /// Filesystem modification time.
    #[default]
    Filemtime,
    /// The generation instant.
    Current,
    /// No timestamp at all.
    None,
}

impl LastmodStrategy {
    /// Parse a strategy name, returning `None` for unrecognized values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "git" => Some(Self::Git),
            "filemtime" | "mtime" => Some(Self::Filemtime),
            "current" | "now" => Some(Self::Current),
            "none" | "" => Some(Self::None),
            _ => None,
        }
    }
}

/// A file found by the walker, with its default URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Path relative to the site root.
    pub rel_path: PathBuf,
    /// Absolute (root-joined) path used for reading.
    pub path: PathBuf,
    /// URL derived from the relative path.
    pub url: String,
}

/// An internal link target found in a page.
///
/// Transient: discarded once the collector has merged the discovered set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryCandidate {
    /// The raw `href` as written in the page.
    pub href: String,
    /// Filesystem path the href resolved to.
    pub resolved_path: PathBuf,
}
