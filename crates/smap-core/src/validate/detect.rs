//! Document kind detection for files of unknown origin.

use std::path::Path;

use super::DocumentKind;

/// Gzip magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// File name with any `.gz` suffix removed, lowercased.
fn logical_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match name.strip_suffix(".gz") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Whether `path` or its leading bytes indicate gzip content.
#[must_use]
pub fn is_gzip(path: &Path, head: &[u8]) -> bool {
    head.starts_with(&GZIP_MAGIC)
        || path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Kind implied by the file name alone, if it is conclusive.
#[must_use]
pub fn detect_by_name(path: &Path) -> Option<DocumentKind> {
    let name = logical_name(path);
    if name.ends_with(".txt") {
        Some(DocumentKind::Txt)
    } else if name.ends_with(".xml") && name.contains("index") {
        Some(DocumentKind::Index)
    } else {
        None
    }
}

/// Kind implied by the document text.
#[must_use]
pub fn sniff(content: &str) -> DocumentKind {
    let head = content.trim_start_matches('\u{feff}').trim_start();
    if !head.starts_with('<') {
        return DocumentKind::Txt;
    }
    if content.contains("<sitemapindex") {
        DocumentKind::Index
    } else {
        DocumentKind::Xml
    }
}

/// Detect the kind of a document: file name conventions first, then content.
#[must_use]
pub fn detect(path: &Path, content: &str) -> DocumentKind {
    detect_by_name(path).unwrap_or_else(|| {
        let sniffed = sniff(content);
        if sniffed == DocumentKind::Txt && logical_name(path).ends_with(".xml") {
            DocumentKind::Xml
        } else {
            sniffed
        }
    })
}
