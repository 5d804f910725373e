//! Rendering of sitemap documents.
//!
//! Output is built as text rather than through an XML writer so the layout is
//! fixed: one element per line, two-space indentation, a trailing newline. The
//! only run-dependent line in a urlset or index document is the generation
//! comment directly after the declaration.

use std::fmt::Write as _;
use std::io::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use quick_xml::escape::escape;

use crate::types::SiteItem;
use crate::{Error, Result};

/// Namespace of the sitemap protocol, version 0.9.
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// One `<sitemap>` entry of an index document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Absolute URL of the referenced sitemap.
    pub loc: String,
    /// When the referenced sitemap was generated.
    pub lastmod: Option<DateTime<Utc>>,
}

/// Format a timestamp the way `lastmod` elements carry it.
#[must_use]
pub fn format_lastmod(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a priority with at least one fractional digit.
///
/// ```rust
/// use smap_core::render::format_priority;
///
/// assert_eq!(format_priority(1.0), "1.0");
/// assert_eq!(format_priority(0.85), "0.85");
/// ```
#[must_use]
pub fn format_priority(priority: f32) -> String {
    let text = priority.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

fn write_header(out: &mut String, generated_at: &DateTime<Utc>) {
    out.push_str(XML_DECLARATION);
    out.push('\n');
    let _ = writeln!(
        out,
        "<!-- Generated by smap on {} -->",
        format_lastmod(generated_at)
    );
}

/// Render a `<urlset>` document.
#[must_use]
pub fn render_urlset(items: &[SiteItem], generated_at: &DateTime<Utc>) -> String {
    let mut out = String::with_capacity(128 + items.len() * 96);
    write_header(&mut out, generated_at);
    let _ = writeln!(out, r#"<urlset xmlns="{SITEMAP_NAMESPACE}">"#);

    for item in items {
        out.push_str("  <url>\n");
        let _ = writeln!(out, "    <loc>{}</loc>", escape(item.url.as_str()));
        if let Some(lastmod) = &item.lastmod {
            let _ = writeln!(out, "    <lastmod>{}</lastmod>", format_lastmod(lastmod));
        }
        if let Some(freq) = item.changefreq {
            let _ = writeln!(out, "    <changefreq>{freq}</changefreq>");
        }
        if let Some(priority) = item.priority {
            let _ = writeln!(out, "    <priority>{}</priority>", format_priority(priority));
        }
        out.push_str("  </url>\n");
    }

    out.push_str("</urlset>\n");
    out
}

/// Render a plain-text sitemap: one URL per line, nothing else.
#[must_use]
pub fn render_txt(items: &[SiteItem]) -> String {
    let mut out = String::with_capacity(items.len() * 64);
    for item in items {
        out.push_str(&item.url);
        out.push('\n');
    }
    out
}

/// Render a `<sitemapindex>` document.
#[must_use]
pub fn render_index(entries: &[IndexEntry], generated_at: &DateTime<Utc>) -> String {
    let mut out = String::with_capacity(128 + entries.len() * 96);
    write_header(&mut out, generated_at);
    let _ = writeln!(out, r#"<sitemapindex xmlns="{SITEMAP_NAMESPACE}">"#);

    for entry in entries {
        out.push_str("  <sitemap>\n");
        let _ = writeln!(out, "    <loc>{}</loc>", escape(entry.loc.as_str()));
        if let Some(lastmod) = &entry.lastmod {
            let _ = writeln!(out, "    <lastmod>{}</lastmod>", format_lastmod(lastmod));
        }
        out.push_str("  </sitemap>\n");
    }

    out.push_str("</sitemapindex>\n");
    out
}

/// Gzip-compress rendered bytes.
pub fn gzip(content: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(content)
        .map_err(|e| Error::Render(format!("gzip failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| Error::Render(format!("gzip failed: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ChangeFrequency;
    use chrono::TimeZone;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_render_urlset_with_metadata() {
        let items = vec![
            SiteItem {
                url: "https://example.com/a?x=1&y=2".to_string(),
                lastmod: Some(at()),
                changefreq: Some(ChangeFrequency::Weekly),
                priority: Some(0.5),
            },
            SiteItem::new("https://example.com/b.html"),
        ];

        let xml = render_urlset(&items, &at());
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<!-- Generated by smap on 2024-05-01T12:30:00Z -->\n\
<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n  \
<url>\n    \
<loc>https://example.com/a?x=1&amp;y=2</loc>\n    \
<lastmod>2024-05-01T12:30:00Z</lastmod>\n    \
<changefreq>weekly</changefreq>\n    \
<priority>0.5</priority>\n  \
</url>\n  \
<url>\n    \
<loc>https://example.com/b.html</loc>\n  \
</url>\n\
</urlset>\n";
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_render_txt() {
        let items = vec![
            SiteItem::new("https://example.com/a"),
            SiteItem::new("https://example.com/b"),
        ];
        assert_eq!(
            render_txt(&items),
            "https://example.com/a\nhttps://example.com/b\n"
        );
    }

    #[test]
    fn test_render_index() {
        let entries = vec![
            IndexEntry {
                loc: "https://example.com/sitemap-1.xml".to_string(),
                lastmod: Some(at()),
            },
            IndexEntry {
                loc: "https://example.com/sitemap-2.xml".to_string(),
                lastmod: None,
            },
        ];
        let xml = render_index(&entries, &at());
        assert!(xml.contains("<sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"));
        assert_eq!(xml.matches("<sitemap>").count(), 2);
        assert_eq!(xml.matches("<lastmod>").count(), 1);
        assert!(xml.ends_with("</sitemapindex>\n"));
    }

    #[test]
    fn test_format_priority() {
        assert_eq!(format_priority(0.0), "0.0");
        assert_eq!(format_priority(1.0), "1.0");
        assert_eq!(format_priority(0.5), "0.5");
        assert_eq!(format_priority(0.85), "0.85");
    }

    #[test]
    fn test_gzip_is_plain_compression() {
        let content = render_txt(&[SiteItem::new("https://example.com/")]);
        let compressed = gzip(content.as_bytes()).unwrap();

        let mut decoded = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, content);
    }
}
