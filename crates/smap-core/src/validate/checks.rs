//! Pattern-based protocol checks.
//!
//! Documents are inspected as text. Nothing here rejects input on the first
//! malformed token: every check runs, each violation becomes a finding, and a
//! section that raises no violation gets one info finding.

use std::sync::LazyLock;

use regex::Regex;

use super::{DocumentKind, Finding, ValidationPolicy};
use crate::render::SITEMAP_NAMESPACE;
use crate::types::ChangeFrequency;

/// XML declaration at the start of the document.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static DECLARATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\x{feff}?\s*<\?xml\s[^>]*\?>").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static URLSET_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<urlset[\s>]").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static URLSET_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</urlset\s*>").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static INDEX_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<sitemapindex[\s>]").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static INDEX_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</sitemapindex\s*>").unwrap());

/// Opening `<url>` tag; does not match `<urlset>`.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static URL_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<url(?:\s[^>]*)?>").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static URL_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</url\s*>").unwrap());

/// Opening `<sitemap>` tag; does not match `<sitemapindex>`.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static SITEMAP_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<sitemap(?:\s[^>]*)?>").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static SITEMAP_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</sitemap\s*>").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static LOC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<loc>\s*(.*?)\s*</loc>").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static LOC_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<loc[\s>]").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static CHANGEFREQ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<changefreq>\s*(.*?)\s*</changefreq>").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static PRIORITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<priority>\s*(.*?)\s*</priority>").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static LASTMOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<lastmod>\s*(.*?)\s*</lastmod>").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static HTTP_URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://\S+$").unwrap());

/// W3C datetime: a date, optionally followed by a time with a zone designator.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static W3C_DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\d{4}(?:-\d{2}(?:-\d{2}(?:T\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:\d{2}))?)?)?$",
    )
    .unwrap()
});

/// Collects findings for one section and reports the section outcome.
struct Section<'a> {
    name: &'static str,
    policy: &'a ValidationPolicy,
    findings: &'a mut Vec<Finding>,
    violations: usize,
}

impl<'a> Section<'a> {
    fn new(name: &'static str, policy: &'a ValidationPolicy, findings: &'a mut Vec<Finding>) -> Self {
        Self {
            name,
            policy,
            findings,
            violations: 0,
        }
    }

    fn violation(&mut self, message: impl Into<String>) {
        self.violations += 1;
        let message = format!("{}: {}", self.name, message.into());
        self.findings.push(if self.policy.strict {
            Finding::error(message)
        } else {
            Finding::warning(message)
        });
    }

    fn finish(self, summary: impl Into<String>) {
        if self.violations == 0 {
            self.findings
                .push(Finding::info(format!("{}: {}", self.name, summary.into())));
        }
    }
}

fn capture_values<'c>(regex: &Regex, content: &'c str) -> Vec<&'c str> {
    regex
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Run every check applicable to `kind` over `content`.
#[must_use]
pub fn check_document(content: &str, kind: DocumentKind, policy: &ValidationPolicy) -> Vec<Finding> {
    let mut findings = Vec::new();
    match kind {
        DocumentKind::Xml | DocumentKind::Index => check_xml(content, kind, policy, &mut findings),
        DocumentKind::Txt => check_txt(content, policy, &mut findings),
    }
    findings
}

fn check_size(content: &str, policy: &ValidationPolicy, section: &mut Section<'_>) {
    let size = content.len() as u64;
    if size > policy.max_bytes {
        section.violation(format!(
            "uncompressed size {size} bytes exceeds the limit of {} bytes",
            policy.max_bytes
        ));
    }
}

fn check_locations<'c>(
    locations: impl IntoIterator<Item = &'c str>,
    policy: &ValidationPolicy,
    findings: &mut Vec<Finding>,
) {
    let mut section = Section::new("locations", policy, findings);
    let mut total = 0usize;
    for loc in locations {
        total += 1;
        if !HTTP_URL_RE.is_match(loc) {
            section.violation(format!("'{loc}' is not an absolute http(s) URL"));
        } else if loc.chars().count() >= policy.max_url_length {
            section.violation(format!(
                "URL of {} characters is not under {} characters",
                loc.chars().count(),
                policy.max_url_length
            ));
        }
    }
    section.finish(format!("{total} locations are valid http(s) URLs"));
}

fn check_xml(content: &str, kind: DocumentKind, policy: &ValidationPolicy, findings: &mut Vec<Finding>) {
    let (root, open_re, close_re, entry, entry_open_re, entry_close_re) = match kind {
        DocumentKind::Index => (
            "sitemapindex",
            &*INDEX_OPEN_RE,
            &*INDEX_CLOSE_RE,
            "sitemap",
            &*SITEMAP_OPEN_RE,
            &*SITEMAP_CLOSE_RE,
        ),
        _ => (
            "urlset",
            &*URLSET_OPEN_RE,
            &*URLSET_CLOSE_RE,
            "url",
            &*URL_OPEN_RE,
            &*URL_CLOSE_RE,
        ),
    };

    let mut structure = Section::new("structure", policy, findings);
    if !DECLARATION_RE.is_match(content) {
        structure.violation("missing XML declaration");
    }
    if !open_re.is_match(content) {
        structure.violation(format!("missing opening <{root}> tag"));
    }
    if !close_re.is_match(content) {
        structure.violation(format!("missing closing </{root}> tag"));
    }
    if !content.contains(SITEMAP_NAMESPACE) {
        structure.violation(format!("missing namespace {SITEMAP_NAMESPACE}"));
    }
    structure.finish(format!("declaration, <{root}> and namespace present"));

    let opens = entry_open_re.find_iter(content).count();
    let closes = entry_close_re.find_iter(content).count();
    let loc_opens = LOC_OPEN_RE.find_iter(content).count();
    let locations = capture_values(&LOC_RE, content);

    let mut entries = Section::new("entries", policy, findings);
    if opens == 0 {
        entries.violation(format!("no <{entry}> elements found"));
    } else if opens != closes {
        entries.violation(format!(
            "{opens} <{entry}> tags but {closes} </{entry}> tags"
        ));
    }
    if loc_opens != locations.len() {
        entries.violation(format!(
            "{loc_opens} <loc> tags but {} complete <loc> elements",
            locations.len()
        ));
    }
    if locations.len() < opens {
        entries.violation(format!(
            "{} of {opens} <{entry}> elements lack a <loc>",
            opens - locations.len()
        ));
    }
    if opens > policy.max_entries {
        entries.violation(format!(
            "{opens} entries exceed the limit of {}",
            policy.max_entries
        ));
    }
    check_size(content, policy, &mut entries);
    entries.finish(format!(
        "{opens} <{entry}> entries within the limit of {}",
        policy.max_entries
    ));

    check_locations(locations, policy, findings);

    if kind == DocumentKind::Xml {
        let mut changefreq = Section::new("changefreq", policy, findings);
        let values = capture_values(&CHANGEFREQ_RE, content);
        for value in &values {
            if !ChangeFrequency::ALL.iter().any(|freq| freq.as_str() == *value) {
                changefreq.violation(format!(
                    "'{value}' is not one of always, hourly, daily, weekly, monthly, yearly, never"
                ));
            }
        }
        changefreq.finish(format!("{} values are valid", values.len()));

        let mut priority = Section::new("priority", policy, findings);
        let values = capture_values(&PRIORITY_RE, content);
        for value in &values {
            match value.parse::<f64>() {
                Ok(p) if (0.0..=1.0).contains(&p) => {},
                Ok(p) => priority.violation(format!("{p} is outside [0.0, 1.0]")),
                Err(_) => priority.violation(format!("'{value}' is not a number")),
            }
        }
        priority.finish(format!("{} values are valid", values.len()));
    }

    let mut lastmod = Section::new("lastmod", policy, findings);
    let values = capture_values(&LASTMOD_RE, content);
    for value in &values {
        if !W3C_DATETIME_RE.is_match(value) {
            lastmod.violation(format!("'{value}' is not a W3C datetime"));
        }
    }
    lastmod.finish(format!("{} values are valid", values.len()));
}

fn check_txt(content: &str, policy: &ValidationPolicy, findings: &mut Vec<Finding>) {
    let body = content.strip_suffix('\n').unwrap_or(content);
    let lines: Vec<&str> = if body.is_empty() {
        Vec::new()
    } else {
        body.split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect()
    };

    let mut structure = Section::new("structure", policy, findings);
    if lines.is_empty() {
        structure.violation("document contains no URLs");
    }
    let blank = lines.iter().filter(|line| line.trim().is_empty()).count();
    if blank > 0 {
        structure.violation(format!("{blank} blank lines"));
    }
    structure.finish("one URL per line");

    let urls: Vec<&str> = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();

    let mut entries = Section::new("entries", policy, findings);
    if urls.len() > policy.max_entries {
        entries.violation(format!(
            "{} entries exceed the limit of {}",
            urls.len(),
            policy.max_entries
        ));
    }
    check_size(content, policy, &mut entries);
    entries.finish(format!(
        "{} entries within the limit of {}",
        urls.len(),
        policy.max_entries
    ));

    check_locations(urls, policy, findings);
}
