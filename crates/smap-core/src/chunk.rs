//! Partitioning of the frozen collection into sitemap files.

use crate::types::SiteItem;

/// One sitemap file to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkFile<'a> {
    /// File name inside the output directory.
    pub name: String,
    /// Items in this file, in collection order.
    pub items: &'a [SiteItem],
}

/// Number of files needed for `len` items at `max_per_file` each.
#[must_use]
pub const fn chunk_count(len: usize, max_per_file: usize) -> usize {
    len.div_ceil(if max_per_file == 0 { 1 } else { max_per_file })
}

/// Insert `-{n}` before the extension of `name`.
///
/// ```rust
/// use smap_core::chunk::numbered_name;
///
/// assert_eq!(numbered_name("sitemap.xml", 2), "sitemap-2.xml");
/// assert_eq!(numbered_name("urls", 1), "urls-1");
/// ```
#[must_use]
pub fn numbered_name(name: &str, n: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{n}.{ext}"),
        _ => format!("{name}-{n}"),
    }
}

/// Split `items` into files of at most `max_per_file` entries.
///
/// A single group keeps `canonical_name`; multiple groups get 1-based numbered
/// names. An empty collection still yields one (empty) canonical file.
#[must_use]
pub fn plan_files<'a>(
    items: &'a [SiteItem],
    max_per_file: usize,
    canonical_name: &str,
) -> Vec<ChunkFile<'a>> {
    if chunk_count(items.len(), max_per_file) <= 1 {
        return vec![ChunkFile {
            name: canonical_name.to_string(),
            items,
        }];
    }

    items
        .chunks(max_per_file.max(1))
        .enumerate()
        .map(|(i, group)| ChunkFile {
            name: numbered_name(canonical_name, i + 1),
            items: group,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn items(n: usize) -> Vec<SiteItem> {
        (0..n)
            .map(|i| SiteItem::new(format!("https://example.com/{i:03}.html")))
            .collect()
    }

    #[test]
    fn test_single_chunk_keeps_canonical_name() {
        let items = items(5);
        let files = plan_files(&items, 5, "sitemap.xml");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "sitemap.xml");
        assert_eq!(files[0].items.len(), 5);
    }

    #[test]
    fn test_twelve_items_five_per_file() {
        let items = items(12);
        let files = plan_files(&items, 5, "sitemap.xml");
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        let sizes: Vec<usize> = files.iter().map(|f| f.items.len()).collect();
        assert_eq!(names, vec!["sitemap-1.xml", "sitemap-2.xml", "sitemap-3.xml"]);
        assert_eq!(sizes, vec![5, 5, 2]);
    }

    #[test]
    fn test_numbered_name_multiple_dots() {
        assert_eq!(numbered_name("site.map.txt", 3), "site.map-3.txt");
        assert_eq!(numbered_name(".hidden", 1), ".hidden-1");
    }

    #[test]
    fn test_empty_collection() {
        let files = plan_files(&[], 10, "sitemap.txt");
        assert_eq!(files.len(), 1);
        assert!(files[0].items.is_empty());
        assert_eq!(chunk_count(0, 10), 0);
    }

    proptest! {
        #[test]
        fn prop_chunks_partition_items(n in 0usize..200, max in 1usize..60) {
            let items = items(n);
            let files = plan_files(&items, max, "sitemap.xml");

            let expected = chunk_count(n, max).max(1);
            prop_assert_eq!(files.len(), expected);
            prop_assert_eq!(chunk_count(n, max), n.div_ceil(max));

            if files.len() > 1 {
                for file in &files[..files.len() - 1] {
                    prop_assert_eq!(file.items.len(), max);
                }
            }
            let rejoined: Vec<&SiteItem> = files.iter().flat_map(|f| f.items.iter()).collect();
            let original: Vec<&SiteItem> = items.iter().collect();
            prop_assert_eq!(rejoined, original);
        }
    }
}
