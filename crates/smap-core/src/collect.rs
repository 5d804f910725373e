//! Merging, deduplication and exclusion of candidate items.
//!
//! Items arrive in three groups whose order sets duplicate precedence: walked
//! pages (with canonical overrides applied), manually configured URLs, then
//! pages found through link discovery. The first occurrence of a URL wins.
//! The total-item cap only limits the discovered tail; walked and manual items
//! are never evicted by it.

use std::collections::HashSet;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::types::SiteItem;
use crate::Result;

/// One exclude-URL entry.
#[derive(Debug, Clone)]
enum UrlPattern {
    Exact(String),
    Wildcard(Regex),
}

/// Matches URLs against exclude entries.
///
/// An entry without `*` or `?` must equal the URL exactly. Otherwise `*`
/// matches any run of characters and `?` exactly one, anchored to the whole URL.
#[derive(Debug, Clone, Default)]
pub struct ExcludeMatcher {
    patterns: Vec<UrlPattern>,
}

impl ExcludeMatcher {
    /// Compile the exclude entries.
    pub fn new(entries: &[String]) -> Result<Self> {
        let mut patterns = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.contains(['*', '?']) {
                let regex = Regex::new(&wildcard_to_regex(entry))
                    .map_err(|e| crate::Error::Config(format!("exclude pattern '{entry}': {e}")))?;
                patterns.push(UrlPattern::Wildcard(regex));
            } else {
                patterns.push(UrlPattern::Exact(entry.clone()));
            }
        }
        Ok(Self { patterns })
    }

    /// Whether `url` is excluded.
    #[must_use]
    pub fn is_excluded(&self, url: &str) -> bool {
        self.patterns.iter().any(|pattern| match pattern {
            UrlPattern::Exact(exact) => exact == url,
            UrlPattern::Wildcard(regex) => regex.is_match(url),
        })
    }
}

/// Translate a `*`/`?` wildcard into an anchored regex.
///
/// Every other character is matched literally.
#[must_use]
pub fn wildcard_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push_str("(?s)^");
    let mut literal = String::new();
    for ch in pattern.chars() {
        match ch {
            '*' | '?' => {
                regex.push_str(&regex::escape(&literal));
                literal.clear();
                regex.push_str(if ch == '*' { ".*" } else { "." });
            },
            other => literal.push(other),
        }
    }
    regex.push_str(&regex::escape(&literal));
    regex.push('$');
    regex
}

/// Counters describing how the collection was assembled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectStats {
    /// Items dropped because an earlier item had the same URL.
    pub duplicates: usize,
    /// Items dropped by exclude entries.
    pub excluded: usize,
    /// Discovered items not merged because the total cap was reached.
    pub capped: usize,
}

/// The frozen, sorted item set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    /// Items sorted ascending by URL, each URL unique.
    pub items: Vec<SiteItem>,
    /// Assembly counters.
    pub stats: CollectStats,
}

/// Merge the three item groups into a deduplicated, sorted collection.
#[instrument(skip_all, fields(walked = walked.len(), manual = manual.len(), discovered = discovered.len()))]
pub fn collect(
    walked: Vec<SiteItem>,
    manual: Vec<SiteItem>,
    discovered: Vec<SiteItem>,
    exclude: &ExcludeMatcher,
    max_total: usize,
) -> Collection {
    let mut seen: HashSet<String> = HashSet::new();
    let mut stats = CollectStats::default();
    let mut items = Vec::with_capacity(walked.len() + manual.len());

    let mut admit = |item: SiteItem, items: &mut Vec<SiteItem>, stats: &mut CollectStats| {
        if seen.contains(&item.url) {
            stats.duplicates += 1;
            return;
        }
        if exclude.is_excluded(&item.url) {
            debug!("Excluded {}", item.url);
            stats.excluded += 1;
            return;
        }
        seen.insert(item.url.clone());
        items.push(item);
    };

    for item in walked.into_iter().chain(manual) {
        admit(item, &mut items, &mut stats);
    }

    let mut discovered = discovered.into_iter();
    for item in discovered.by_ref() {
        if items.len() >= max_total {
            stats.capped += 1;
            break;
        }
        admit(item, &mut items, &mut stats);
    }
    stats.capped += discovered.count();

    items.sort_by(|a, b| a.url.cmp(&b.url));
    debug!(
        items = items.len(),
        duplicates = stats.duplicates,
        excluded = stats.excluded,
        capped = stats.capped,
        "Collection frozen"
    );

    Collection { items, stats }
}
