//! Directory traversal of the built site.
//!
//! The walker enumerates regular files below the content root, keeps the ones
//! matching an include glob and no exclude glob, then drops anything on the
//! non-navigable extension list. Symlinks are never followed and entries are
//! visited in file-name order so repeated runs see the same sequence.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, instrument};
use url::Url;
use walkdir::WalkDir;

use crate::normalize::url_for_path;
use crate::types::WalkedFile;
use crate::Result;

/// Extensions that never correspond to a navigable page.
pub const SKIP_EXTENSIONS: &[&str] = &["map"];

/// Files found by a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Matched files in traversal order.
    pub files: Vec<WalkedFile>,
    /// Files that matched the globs but were dropped by extension.
    pub skipped: usize,
}

/// Glob-filtered walker over a site root.
#[derive(Debug, Clone)]
pub struct FileWalker {
    root: PathBuf,
    include: GlobSet,
    exclude: GlobSet,
    exclude_patterns: Vec<String>,
    skip_extensions: Vec<String>,
}

impl FileWalker {
    /// Build a walker for `root`.
    ///
    /// Globs are matched against paths relative to the root, with `*` confined
    /// to a single path segment and `**` spanning directories.
    pub fn new(
        root: impl Into<PathBuf>,
        include: &[String],
        exclude: &[String],
        exclude_extensions: &[String],
    ) -> Result<Self> {
        let skip_extensions = SKIP_EXTENSIONS
            .iter()
            .map(|ext| (*ext).to_string())
            .chain(exclude_extensions.iter().map(|ext| ext.to_lowercase()))
            .collect();

        Ok(Self {
            root: root.into(),
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
            exclude_patterns: exclude.to_vec(),
            skip_extensions,
        })
    }

    /// Additionally exclude the given root-relative globs.
    ///
    /// Used to keep previously written sitemap artifacts out of the walk when
    /// the output directory lives inside the root.
    pub fn exclude_also(mut self, patterns: &[String]) -> Result<Self> {
        self.exclude_patterns.extend_from_slice(patterns);
        self.exclude = build_globset(&self.exclude_patterns)?;
        Ok(self)
    }

    /// The directory being walked.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the root and derive the default URL of every surviving file.
    #[instrument(skip(self, base), fields(root = %self.root.display()))]
    pub fn walk(&self, base: &Url) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();

        let entries = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {e}");
                    continue;
                },
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Ok(rel_path) = path.strip_prefix(&self.root) else {
                continue;
            };
            if !self.include.is_match(rel_path) || self.exclude.is_match(rel_path) {
                continue;
            }
            if self.has_skipped_extension(rel_path) {
                debug!("Skipping non-navigable file {}", rel_path.display());
                outcome.skipped += 1;
                continue;
            }

            outcome.files.push(WalkedFile {
                rel_path: rel_path.to_path_buf(),
                path: path.to_path_buf(),
                url: url_for_path(base, &self.root, path),
            });
        }

        debug!(
            files = outcome.files.len(),
            skipped = outcome.skipped,
            "Walk complete"
        );
        outcome
    }

    /// Whether a file reached some other way than the walk may become a URL.
    ///
    /// Exclude globs (artifact globs included) and the extension skip list
    /// apply; include globs only scope the walk itself.
    #[must_use]
    pub fn accepts(&self, rel_path: &Path) -> bool {
        !self.exclude.is_match(rel_path) && !self.has_skipped_extension(rel_path)
    }

    fn has_skipped_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_lowercase();
                self.skip_extensions.iter().any(|skip| *skip == ext)
            })
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern).literal_separator(true).build()?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "<html></html>").unwrap();
    }

    fn base() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    fn urls(outcome: &WalkOutcome) -> Vec<&str> {
        outcome.files.iter().map(|f| f.url.as_str()).collect()
    }

    #[test]
    fn test_walk_matches_include_globs() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "index.html");
        touch(dir.path(), "blog/post.html");
        touch(dir.path(), "style.css");

        let walker = FileWalker::new(dir.path(), &["**/*.html".into()], &[], &[]).unwrap();
        let outcome = walker.walk(&base());

        assert_eq!(
            urls(&outcome),
            vec![
                "https://example.com/blog/post.html",
                "https://example.com/index.html",
            ]
        );
        assert_eq!(outcome.skipped, 0);
    }

    #[test]
    fn test_walk_applies_excludes_and_skip_list() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "index.html");
        touch(dir.path(), "drafts/wip.html");
        touch(dir.path(), "app.js.map");
        touch(dir.path(), "feed.json");

        let walker = FileWalker::new(
            dir.path(),
            &["**/*".into()],
            &["drafts/**".into()],
            &["json".into()],
        )
        .unwrap();
        let outcome = walker.walk(&base());

        assert_eq!(urls(&outcome), vec!["https://example.com/index.html"]);
        assert_eq!(outcome.skipped, 2);
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "top.html");
        touch(dir.path(), "nested/deep.html");

        let walker = FileWalker::new(dir.path(), &["*.html".into()], &[], &[]).unwrap();
        let outcome = walker.walk(&base());
        assert_eq!(urls(&outcome), vec!["https://example.com/top.html"]);
    }

    #[test]
    fn test_exclude_also_hides_artifacts() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "index.html");
        touch(dir.path(), "sitemap.xml");

        let walker = FileWalker::new(dir.path(), &["**/*".into()], &[], &[])
            .unwrap()
            .exclude_also(&["sitemap.xml".into()])
            .unwrap();
        let outcome = walker.walk(&base());
        assert_eq!(urls(&outcome), vec!["https://example.com/index.html"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_not_followed() {
        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        touch(outside.path(), "secret.html");
        touch(dir.path(), "index.html");
        std::os::unix::fs::symlink(outside.path(), dir.path().join("linked")).unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("index.html"),
            dir.path().join("alias.html"),
        )
        .unwrap();

        let walker = FileWalker::new(dir.path(), &["**/*".into()], &[], &[]).unwrap();
        let outcome = walker.walk(&base());
        assert_eq!(urls(&outcome), vec!["https://example.com/index.html"]);
    }

    #[test]
    fn test_accepts_applies_excludes_but_not_includes() {
        let dir = tempdir().unwrap();
        let walker = FileWalker::new(
            dir.path(),
            &["index.html".into()],
            &["drafts/**".into()],
            &["json".into()],
        )
        .unwrap()
        .exclude_also(&["sitemap.xml".into()])
        .unwrap();

        assert!(walker.accepts(Path::new("pages/about.html")));
        assert!(!walker.accepts(Path::new("drafts/wip.html")));
        assert!(!walker.accepts(Path::new("sitemap.xml")));
        assert!(!walker.accepts(Path::new("app.js.map")));
        assert!(!walker.accepts(Path::new("feed.JSON")));
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let dir = tempdir().unwrap();
        let err = FileWalker::new(dir.path(), &["[".into()], &[], &[]).unwrap_err();
        assert_eq!(err.category(), "config");
    }
}
