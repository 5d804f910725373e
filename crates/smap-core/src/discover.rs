//! Canonical resolution and internal link discovery for HTML pages.
//!
//! Both features share one parse per page: [`scan_page`] pulls the first
//! canonical link and every anchor href out of a document, then
//! [`resolve_canonical`] and [`LinkDiscoverer`] interpret them against the site
//! root. Failures never escape a single page; an unreadable or unparsable file
//! simply contributes nothing.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::normalize::{resolve_href, url_for_path};
use crate::types::DiscoveryCandidate;
use crate::walker::FileWalker;
use crate::{Error, Result};

/// Extensions treated as HTML documents.
const HTML_EXTENSIONS: &[&str] = &["html", "htm", "xhtml"];

/// Selector for link elements carrying a `rel` attribute.
///
/// SAFETY: Selector is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link[rel][href]").unwrap());

/// Selector for anchors with an href.
///
/// SAFETY: Selector is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Links extracted from one HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// First canonical href, if any.
    pub canonical: Option<String>,
    /// Anchor hrefs in document order.
    pub anchors: Vec<String>,
}

/// Whether `path` looks like an HTML page.
#[must_use]
pub fn is_html_like(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            HTML_EXTENSIONS
                .iter()
                .any(|html| ext.eq_ignore_ascii_case(html))
        })
}

/// Extract the canonical link and anchor hrefs from HTML text.
///
/// The parser is tolerant: malformed markup yields whatever elements could be
/// recovered rather than an error.
#[must_use]
pub fn scan_html(content: &str) -> PageLinks {
    let document = Html::parse_document(content);

    let canonical = document
        .select(&LINK_SELECTOR)
        .find(|element| {
            element.value().attr("rel").is_some_and(|rel| {
                rel.split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("canonical"))
            })
        })
        .and_then(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty());

    let anchors = document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect();

    PageLinks { canonical, anchors }
}

/// Read and scan one page.
pub fn scan_page(path: &Path) -> Result<PageLinks> {
    let bytes = fs::read(path).map_err(|e| Error::Discovery {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(scan_html(&String::from_utf8_lossy(&bytes)))
}

fn is_absolute_http(href: &str) -> bool {
    let lowered = href.get(..8).unwrap_or(href).to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

/// Resolve a canonical href declared by the page at `file`.
///
/// Absolute `http(s)` hrefs are returned unchanged. A root-relative href
/// (`/x.html`) resolves against the site root; any other relative href resolves
/// against the directory containing `file`. Targets outside the root, and hrefs
/// with other schemes, yield `None`.
#[must_use]
pub fn resolve_canonical(href: &str, file: &Path, root: &Path, base: &Url) -> Option<String> {
    let href = href.trim();
    if is_absolute_http(href) {
        return Some(href.to_string());
    }

    let resolved = if let Some(stripped) = href.strip_prefix('/') {
        if stripped.starts_with('/') {
            return None;
        }
        resolve_href(root, stripped)?
    } else {
        resolve_href(file.parent()?, href)?
    };

    if !resolved.starts_with(root) {
        debug!(
            "Canonical {href} in {} points outside the site root",
            file.display()
        );
        return None;
    }
    Some(url_for_path(base, root, &resolved))
}

/// Accumulates pages reachable through internal anchors, bounded by a global cap.
///
/// Targets pass the same exclude globs and extension skip list as walked files.
#[derive(Debug)]
pub struct LinkDiscoverer {
    walker: FileWalker,
    base: Url,
    cap: usize,
    known: HashSet<String>,
    seen: HashSet<String>,
    candidates: Vec<DiscoveryCandidate>,
    urls: Vec<String>,
    cap_reached: bool,
}

impl LinkDiscoverer {
    /// Create a discoverer for the root of `walker`.
    ///
    /// `known` holds URLs already produced by the walk; links to them are not
    /// counted as discoveries.
    pub fn new(walker: FileWalker, base: Url, cap: usize, known: HashSet<String>) -> Self {
        Self {
            walker,
            base,
            cap,
            known,
            seen: HashSet::new(),
            candidates: Vec::new(),
            urls: Vec::new(),
            cap_reached: false,
        }
    }

    /// Offer the anchors of one page.
    ///
    /// The cap is checked before every addition. Once it is hit, later pages
    /// still get scanned by the caller but contribute nothing here.
    pub fn offer(&mut self, page: &Path, anchors: &[String]) {
        for href in anchors {
            if self.urls.len() >= self.cap {
                if !self.cap_reached {
                    self.cap_reached = true;
                    warn!(
                        "Link discovery cap of {} reached while scanning {}",
                        self.cap,
                        page.display()
                    );
                }
                return;
            }
            if href.starts_with('#') || is_absolute_http(href) {
                continue;
            }

            let Some(resolved) = self.resolve(href) else {
                continue;
            };
            let url = url_for_path(&self.base, self.walker.root(), &resolved);
            if self.known.contains(&url) || !self.seen.insert(url.clone()) {
                continue;
            }

            debug!("Discovered {url} from {}", page.display());
            self.candidates.push(DiscoveryCandidate {
                href: href.clone(),
                resolved_path: resolved,
            });
            self.urls.push(url);
        }
    }

    fn resolve(&self, href: &str) -> Option<PathBuf> {
        let trimmed = href.trim_start_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        let root = self.walker.root();
        let resolved = resolve_href(root, trimmed)?;
        let rel_path = resolved.strip_prefix(root).ok()?;
        if !self.walker.accepts(rel_path) {
            debug!("Link target {} is excluded", rel_path.display());
            return None;
        }
        fs::metadata(&resolved)
            .is_ok_and(|meta| meta.is_file())
            .then_some(resolved)
    }

    /// Whether the cap stopped any addition.
    #[must_use]
    pub const fn cap_reached(&self) -> bool {
        self.cap_reached
    }

    /// Consume the discoverer, returning `(url, candidate)` pairs in discovery order.
    #[must_use]
    pub fn finish(self) -> Vec<(String, DiscoveryCandidate)> {
        self.urls.into_iter().zip(self.candidates).collect()
    }
}
