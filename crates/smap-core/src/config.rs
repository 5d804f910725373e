//! Run configuration: raw settings and the validated record built from them.
//!
//! Settings arrive loosely typed (a TOML file, CLI flags, or both) as
//! [`SiteSettings`]. A single validation pass turns them into a [`SiteConfig`],
//! reporting every problem at once through [`Error::InvalidConfig`]. Nothing in the
//! pipeline reads process environment: limits and toggles travel inside the
//! validated record.
//!
//! ## Example Configuration File
//!
//! ```toml
//! base-url = "https://example.com/"
//! root = "public"
//! include = ["**/*.html"]
//! exclude-urls = ["https://example.com/drafts/*"]
//! lastmod = "git"
//! changefreq = "weekly"
//! priority = 0.5
//! txt = true
//! gzip = true
//! max-per-file = 50000
//! ```
//!
//! ## Validating
//!
//! ```rust
//! use smap_core::SiteSettings;
//!
//! let settings = SiteSettings {
//!     base_url: Some("ftp://example.com".to_string()),
//!     priority: Some(1.5),
//!     ..SiteSettings::default()
//! };
//! let err = settings.validate().unwrap_err();
//! assert!(err.to_string().contains("base URL"));
//! assert!(err.to_string().contains("priority"));
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use globset::Glob;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::{ChangeFrequency, LastmodStrategy};
use crate::{Error, Result};

/// Maximum number of URLs a single sitemap may hold per the protocol.
pub const PROTOCOL_MAX_URLS: usize = 50_000;

/// Maximum uncompressed size of a single sitemap per the protocol.
pub const PROTOCOL_MAX_BYTES: u64 = 50 * 1024 * 1024;

/// Maximum length of a `loc` value.
pub const MAX_URL_LENGTH: usize = 2048;

const DEFAULT_MAX_DISCOVERED: usize = 1_000;
const DEFAULT_MAX_TOTAL: usize = 100_000;
const DEFAULT_XML_NAME: &str = "sitemap.xml";
const DEFAULT_TXT_NAME: &str = "sitemap.txt";
const DEFAULT_INDEX_NAME: &str = "sitemap-index.xml";

/// Raw settings as read from a TOML file or assembled from CLI flags.
///
/// Every field is optional; defaults are applied during [`SiteSettings::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SiteSettings {
    /// Public base URL of the site.
    pub base_url: Option<String>,
    /// Built site directory to scan.
    pub root: Option<PathBuf>,
    /// Include globs, relative to the root.
    pub include: Vec<String>,
    /// Exclude globs, relative to the root.
    pub exclude: Vec<String>,
    /// URLs (exact or `*`/`?` wildcards) removed from the output.
    pub exclude_urls: Vec<String>,
    /// File extensions never turned into URLs.
    pub exclude_extensions: Vec<String>,
    /// Extra URLs added to the collection.
    pub additional_urls: Vec<String>,
    /// Lastmod strategy name.
    pub lastmod: Option<String>,
    /// Change frequency applied to every item.
    pub changefreq: Option<String>,
    /// Priority applied to every item.
    pub priority: Option<f32>,
    /// Honor `<link rel="canonical">` in HTML pages.
    pub canonical: Option<bool>,
    /// Follow internal anchors to discover extra pages.
    pub discover_links: Option<bool>,
    /// Emit the XML sitemap.
    pub xml: Option<bool>,
    /// Emit the TXT sitemap.
    pub txt: Option<bool>,
    /// Emit gzip copies of every document.
    pub gzip: Option<bool>,
    /// Treat protocol violations as errors.
    pub strict: Option<bool>,
    /// Directory the documents are written to (defaults to the root).
    pub output_dir: Option<PathBuf>,
    /// File name of the XML sitemap.
    pub xml_name: Option<String>,
    /// File name of the TXT sitemap.
    pub txt_name: Option<String>,
    /// File name of the sitemap index.
    pub index_name: Option<String>,
    /// Maximum URLs per sitemap file.
    pub max_per_file: Option<usize>,
    /// Maximum pages added through link discovery.
    pub max_discovered: Option<usize>,
    /// Running total after which discovered pages are no longer added.
    pub max_total: Option<usize>,
    /// Maximum entries a validated document may contain.
    pub max_validate_entries: Option<usize>,
    /// Existing documents to validate independently of generation.
    pub validate: Vec<PathBuf>,
}

/// Toggles controlling which parts of the pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Features {
    /// Honor canonical links.
    pub canonical: bool,
    /// Discover pages through internal anchors.
    pub discover_links: bool,
    /// Emit XML documents.
    pub xml: bool,
    /// Emit TXT documents.
    pub txt: bool,
    /// Emit gzip copies.
    pub gzip: bool,
    /// Strict validation policy.
    pub strict: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            canonical: true,
            discover_links: false,
            xml: true,
            txt: false,
            gzip: false,
            strict: false,
        }
    }
}

/// Where documents are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputConfig {
    /// Output directory.
    pub dir: PathBuf,
    /// Canonical XML file name.
    pub xml_name: String,
    /// Canonical TXT file name.
    pub txt_name: String,
    /// Index file name, used only when the collection is split.
    pub index_name: String,
}

/// Caps threaded through every component of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Limits {
    /// Maximum URLs per sitemap file.
    pub max_per_file: usize,
    /// Maximum pages added through link discovery.
    pub max_discovered: usize,
    /// Running total after which discovered pages are no longer merged.
    pub max_total: usize,
    /// Maximum entries accepted by the validator.
    pub max_entries: usize,
    /// Maximum uncompressed document size accepted by the validator.
    pub max_document_bytes: u64,
    /// Maximum length of a location value.
    pub max_url_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_per_file: PROTOCOL_MAX_URLS,
            max_discovered: DEFAULT_MAX_DISCOVERED,
            max_total: DEFAULT_MAX_TOTAL,
            max_entries: PROTOCOL_MAX_URLS,
            max_document_bytes: PROTOCOL_MAX_BYTES,
            max_url_length: MAX_URL_LENGTH,
        }
    }
}

/// Validated configuration for one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    /// Base URL, always ending in `/`.
    pub base_url: Url,
    /// Built site directory.
    pub root: PathBuf,
    /// Include globs (never empty).
    pub include: Vec<String>,
    /// Exclude globs.
    pub exclude: Vec<String>,
    /// Exclude-URL patterns.
    pub exclude_urls: Vec<String>,
    /// Lowercased extensions without a leading dot.
    pub exclude_extensions: Vec<String>,
    /// Manual URLs, already absolute.
    pub additional_urls: Vec<String>,
    /// Lastmod strategy.
    pub lastmod: LastmodStrategy,
    /// Change frequency for every item.
    pub changefreq: Option<ChangeFrequency>,
    /// Priority for every item.
    pub priority: Option<f32>,
    /// Pipeline toggles.
    pub features: Features,
    /// Output locations.
    pub output: OutputConfig,
    /// Run limits.
    pub limits: Limits,
    /// External documents to validate.
    pub validate: Vec<PathBuf>,
}

impl SiteSettings {
    /// Load settings from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Layer `overrides` on top of `self`.
    ///
    /// Scalar values present in `overrides` win; list values win when non-empty.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        fn list<T>(base: Vec<T>, over: Vec<T>) -> Vec<T> {
            if over.is_empty() { base } else { over }
        }

        Self {
            base_url: overrides.base_url.or(self.base_url),
            root: overrides.root.or(self.root),
            include: list(self.include, overrides.include),
            exclude: list(self.exclude, overrides.exclude),
            exclude_urls: list(self.exclude_urls, overrides.exclude_urls),
            exclude_extensions: list(self.exclude_extensions, overrides.exclude_extensions),
            additional_urls: list(self.additional_urls, overrides.additional_urls),
            lastmod: overrides.lastmod.or(self.lastmod),
            changefreq: overrides.changefreq.or(self.changefreq),
            priority: overrides.priority.or(self.priority),
            canonical: overrides.canonical.or(self.canonical),
            discover_links: overrides.discover_links.or(self.discover_links),
            xml: overrides.xml.or(self.xml),
            txt: overrides.txt.or(self.txt),
            gzip: overrides.gzip.or(self.gzip),
            strict: overrides.strict.or(self.strict),
            output_dir: overrides.output_dir.or(self.output_dir),
            xml_name: overrides.xml_name.or(self.xml_name),
            txt_name: overrides.txt_name.or(self.txt_name),
            index_name: overrides.index_name.or(self.index_name),
            max_per_file: overrides.max_per_file.or(self.max_per_file),
            max_discovered: overrides.max_discovered.or(self.max_discovered),
            max_total: overrides.max_total.or(self.max_total),
            max_validate_entries: overrides.max_validate_entries.or(self.max_validate_entries),
            validate: list(self.validate, overrides.validate),
        }
    }

    /// Validate the settings, producing the run configuration and any non-fatal warnings.
    ///
    /// Every problem is collected before returning, so a single
    /// [`Error::InvalidConfig`] lists all of them.
    pub fn validate(self) -> Result<(SiteConfig, Vec<String>)> {
        let mut problems = Vec::new();
        let mut warnings = Vec::new();

        let base_url = match self.base_url.as_deref().map(str::trim) {
            None | Some("") => {
                problems.push("base URL is required".to_string());
                None
            },
            Some(raw) => match parse_base_url(raw) {
                Ok(url) => Some(url),
                Err(reason) => {
                    problems.push(reason);
                    None
                },
            },
        };

        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        if !root.is_dir() {
            problems.push(format!(
                "content root {} does not exist or is not a directory",
                root.display()
            ));
        }

        let include = if self.include.is_empty() {
            vec!["**/*".to_string()]
        } else {
            self.include
        };
        for pattern in include.iter().chain(self.exclude.iter()) {
            if let Err(e) = Glob::new(pattern) {
                problems.push(format!("invalid glob '{pattern}': {e}"));
            }
        }

        let lastmod = match self.lastmod.as_deref() {
            None => LastmodStrategy::default(),
            Some(raw) => LastmodStrategy::parse(raw).unwrap_or_else(|| {
                warnings.push(format!(
                    "unrecognized lastmod strategy '{raw}'; no timestamps will be written"
                ));
                LastmodStrategy::None
            }),
        };

        let changefreq = match self.changefreq.as_deref() {
            None => None,
            Some(raw) => match raw.parse::<ChangeFrequency>() {
                Ok(freq) => Some(freq),
                Err(_) => {
                    problems.push(format!(
                        "changefreq '{raw}' must be one of always, hourly, daily, weekly, monthly, yearly, never"
                    ));
                    None
                },
            },
        };

        if let Some(priority) = self.priority {
            if !(0.0..=1.0).contains(&priority) {
                problems.push(format!("priority {priority} must be between 0.0 and 1.0"));
            }
        }

        let max_per_file = self.max_per_file.unwrap_or(PROTOCOL_MAX_URLS);
        if !(1..=PROTOCOL_MAX_URLS).contains(&max_per_file) {
            problems.push(format!(
                "max-per-file {max_per_file} must be between 1 and {PROTOCOL_MAX_URLS}"
            ));
        }

        let xml_name = self.xml_name.unwrap_or_else(|| DEFAULT_XML_NAME.to_string());
        let txt_name = self.txt_name.unwrap_or_else(|| DEFAULT_TXT_NAME.to_string());
        let index_name = self
            .index_name
            .unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string());
        for (label, name) in [("xml", &xml_name), ("txt", &txt_name), ("index", &index_name)] {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                problems.push(format!(
                    "{label} file name '{name}' must be a plain, non-empty file name"
                ));
            }
        }

        let mut additional_urls = Vec::with_capacity(self.additional_urls.len());
        for raw in &self.additional_urls {
            let raw = raw.trim();
            if raw.starts_with("http://") || raw.starts_with("https://") {
                additional_urls.push(raw.to_string());
            } else if raw.contains("://") {
                problems.push(format!("additional URL '{raw}' must use http or https"));
            } else if let Some(base) = &base_url {
                additional_urls.push(crate::normalize::join(base, raw));
            }
        }

        let features = Features {
            canonical: self.canonical.unwrap_or(true),
            discover_links: self.discover_links.unwrap_or(false),
            xml: self.xml.unwrap_or(true),
            txt: self.txt.unwrap_or(false),
            gzip: self.gzip.unwrap_or(false),
            strict: self.strict.unwrap_or(false),
        };
        if !features.xml && !features.txt && self.validate.is_empty() {
            warnings.push("both XML and TXT output are disabled; nothing will be written".into());
        }

        let Some(base_url) = base_url else {
            return Err(Error::InvalidConfig { problems });
        };
        if !problems.is_empty() {
            return Err(Error::InvalidConfig { problems });
        }

        let limits = Limits {
            max_per_file,
            max_discovered: self.max_discovered.unwrap_or(DEFAULT_MAX_DISCOVERED),
            max_total: self.max_total.unwrap_or(DEFAULT_MAX_TOTAL),
            max_entries: self.max_validate_entries.unwrap_or(PROTOCOL_MAX_URLS),
            ..Limits::default()
        };

        let exclude_extensions = self
            .exclude_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        let config = SiteConfig {
            base_url,
            output: OutputConfig {
                dir: self.output_dir.unwrap_or_else(|| root.clone()),
                xml_name,
                txt_name,
                index_name,
            },
            root,
            include,
            exclude: self.exclude,
            exclude_urls: self.exclude_urls,
            exclude_extensions,
            additional_urls,
            lastmod,
            changefreq,
            priority: self.priority,
            features,
            limits,
            validate: self.validate,
        };

        Ok((config, warnings))
    }
}

/// Parse and normalize the base URL so it always ends in `/`.
fn parse_base_url(raw: &str) -> std::result::Result<Url, String> {
    if !(raw.starts_with("http://") || raw.starts_with("https://")) {
        return Err(format!(
            "base URL '{raw}' must start with http:// or https://"
        ));
    }
    let mut url = Url::parse(raw).map_err(|e| format!("base URL '{raw}' is invalid: {e}"))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn settings_for(root: &Path) -> SiteSettings {
        SiteSettings {
            base_url: Some("https://example.com".to_string()),
            root: Some(root.to_path_buf()),
            ..SiteSettings::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let dir = tempdir().unwrap();
        let (config, warnings) = settings_for(dir.path()).validate().unwrap();

        assert!(warnings.is_empty());
        assert_eq!(config.base_url.as_str(), "https://example.com/");
        assert_eq!(config.include, vec!["**/*".to_string()]);
        assert_eq!(config.lastmod, LastmodStrategy::Filemtime);
        assert_eq!(config.output.dir, dir.path());
        assert_eq!(config.output.xml_name, "sitemap.xml");
        assert_eq!(config.limits.max_per_file, PROTOCOL_MAX_URLS);
        assert!(config.features.xml);
        assert!(!config.features.txt);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let dir = tempdir().unwrap();
        let mut settings = settings_for(dir.path());
        settings.base_url = Some("https://example.com/docs".to_string());
        let (config, _) = settings.validate().unwrap();
        assert_eq!(config.base_url.as_str(), "https://example.com/docs/");
    }

    #[test]
    fn test_collects_every_problem() {
        let settings = SiteSettings {
            base_url: Some("ftp://example.com".to_string()),
            root: Some(PathBuf::from("/definitely/not/here")),
            changefreq: Some("fortnightly".to_string()),
            priority: Some(1.5),
            max_per_file: Some(0),
            ..SiteSettings::default()
        };

        let Err(Error::InvalidConfig { problems }) = settings.validate() else {
            panic!("expected invalid configuration");
        };
        assert_eq!(problems.len(), 5, "{problems:?}");
        assert!(problems.iter().any(|p| p.contains("base URL")));
        assert!(problems.iter().any(|p| p.contains("content root")));
        assert!(problems.iter().any(|p| p.contains("changefreq")));
        assert!(problems.iter().any(|p| p.contains("priority")));
        assert!(problems.iter().any(|p| p.contains("max-per-file")));
    }

    #[test]
    fn test_priority_out_of_range_is_fatal() {
        let dir = tempdir().unwrap();
        for bad in [-0.1_f32, 1.01, f32::NAN] {
            let mut settings = settings_for(dir.path());
            settings.priority = Some(bad);
            assert!(settings.validate().is_err(), "priority {bad} accepted");
        }
        let mut settings = settings_for(dir.path());
        settings.priority = Some(1.0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_unknown_lastmod_is_warning() {
        let dir = tempdir().unwrap();
        let mut settings = settings_for(dir.path());
        settings.lastmod = Some("svn".to_string());
        let (config, warnings) = settings.validate().unwrap();
        assert_eq!(config.lastmod, LastmodStrategy::None);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("svn"));
    }

    #[test]
    fn test_invalid_glob_reported() {
        let dir = tempdir().unwrap();
        let mut settings = settings_for(dir.path());
        settings.include = vec!["**/[.html".to_string()];
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("invalid glob"));
    }

    #[test]
    fn test_additional_urls_resolved_against_base() {
        let dir = tempdir().unwrap();
        let mut settings = settings_for(dir.path());
        settings.additional_urls = vec![
            "/extra.html".to_string(),
            "https://other.example.com/x".to_string(),
        ];
        let (config, _) = settings.validate().unwrap();
        assert_eq!(
            config.additional_urls,
            vec![
                "https://example.com/extra.html".to_string(),
                "https://other.example.com/x".to_string(),
            ]
        );
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let file = SiteSettings {
            base_url: Some("https://file.example.com".to_string()),
            include: vec!["**/*.html".to_string()],
            txt: Some(true),
            ..SiteSettings::default()
        };
        let flags = SiteSettings {
            base_url: Some("https://flag.example.com".to_string()),
            gzip: Some(true),
            ..SiteSettings::default()
        };
        let merged = file.merge(flags);
        assert_eq!(merged.base_url.as_deref(), Some("https://flag.example.com"));
        assert_eq!(merged.include, vec!["**/*.html".to_string()]);
        assert_eq!(merged.txt, Some(true));
        assert_eq!(merged.gzip, Some(true));
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("smap.toml");
        fs::write(
            &path,
            "base-url = \"https://example.com\"\ninclude = [\"**/*.html\"]\nmax-per-file = 10\ngzip = true\n",
        )
        .unwrap();

        let settings = SiteSettings::from_toml_file(&path).unwrap();
        assert_eq!(settings.max_per_file, Some(10));
        assert_eq!(settings.gzip, Some(true));
        assert_eq!(settings.include, vec!["**/*.html".to_string()]);
    }

    #[test]
    fn test_from_toml_file_rejects_unknown_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("smap.toml");
        fs::write(&path, "base-urll = \"https://example.com\"\n").unwrap();
        assert!(SiteSettings::from_toml_file(&path).is_err());
    }
}
