//! URL normalization between site paths and absolute URLs.
//!
//! The base URL handed to these helpers has already been validated and ends in
//! `/`, so none of them can fail: a root-relative path (`/about.html`), a
//! dot-relative path (`./about.html`) and a bare path (`about.html`) all resolve
//! to the same URL underneath the base.
//!
//! ```rust
//! use smap_core::normalize::join;
//! use url::Url;
//!
//! let base = Url::parse("https://example.com/docs/").unwrap();
//! assert_eq!(join(&base, "/about.html"), "https://example.com/docs/about.html");
//! assert_eq!(join(&base, "./about.html"), "https://example.com/docs/about.html");
//! assert_eq!(join(&base, "about.html"), "https://example.com/docs/about.html");
//! ```

use std::path::{Component, Path, PathBuf};

use url::Url;

/// Resolve a site-relative path against the base URL.
#[must_use]
pub fn join(base: &Url, rel: &str) -> String {
    let trimmed = rel.trim().trim_start_matches('/');
    match base.join(trimmed) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{base}{trimmed}"),
    }
}

/// Build the absolute URL for a file beneath `root`.
///
/// Each path component becomes one URL segment (percent-encoded as needed),
/// independent of the platform separator.
#[must_use]
pub fn url_for_path(base: &Url, root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let segments: Vec<String> = rel
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let mut url = base.clone();
    if let Ok(mut path_segments) = url.path_segments_mut() {
        path_segments.pop_if_empty().extend(segments.iter());
    } else {
        return join(base, &segments.join("/"));
    }
    url.to_string()
}

/// Resolve an href against a directory, producing a filesystem path.
///
/// Query strings and fragments are dropped, percent-escapes are decoded and
/// `.`/`..` segments are folded. Returns `None` when the href cannot be mapped
/// to a local path.
#[must_use]
pub fn resolve_href(dir: &Path, href: &str) -> Option<PathBuf> {
    let dir_url = Url::from_directory_path(dir).ok()?;
    let mut target = dir_url.join(href.trim()).ok()?;
    if target.scheme() != "file" {
        return None;
    }
    target.set_query(None);
    target.set_fragment(None);
    target.to_file_path().ok()
}

/// Fold `.` and `..` components without touching the filesystem.
#[must_use]
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            },
            other => normalized.push(other),
        }
    }
    normalized
}
