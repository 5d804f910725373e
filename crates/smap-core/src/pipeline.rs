//! End-to-end generation run.
//!
//! A run walks the site, resolves canonical links and discovers linked pages in
//! a single pass over each HTML file, freezes the collection, then hands the
//! rendered documents to the emitter. External documents named in the
//! configuration are validated last.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::collect::{CollectStats, ExcludeMatcher, collect};
use crate::config::SiteConfig;
use crate::discover::{LinkDiscoverer, is_html_like, resolve_canonical, scan_page};
use crate::emit::{ArtifactOutcome, artifact_globs, build_plan, execute};
use crate::lastmod::TimestampResolver;
use crate::normalize::lexical_normalize;
use crate::types::{SiteItem, WalkedFile};
use crate::validate::{BatchReport, ValidationPolicy, validate_files};
use crate::walker::FileWalker;
use crate::{Error, Result};

/// What a run did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Generation instant shared by every timestamp of the run.
    pub generated_at: DateTime<Utc>,
    /// Files matched by the walk.
    pub walked: usize,
    /// Files dropped by the extension skip list.
    pub skipped: usize,
    /// Walked pages whose URL came from a canonical link.
    pub canonical_overrides: usize,
    /// Manual URLs offered to the collector.
    pub manual: usize,
    /// Pages found through link discovery.
    pub discovered: usize,
    /// Items in the final collection.
    pub items: usize,
    /// Number of sitemap chunks.
    pub chunks: usize,
    /// Collector counters.
    pub collect: CollectStats,
    /// Non-fatal problems, in the order they arose.
    pub warnings: Vec<String>,
    /// Per-artifact-type write and validation results.
    pub artifacts: Vec<ArtifactOutcome>,
    /// Results for externally supplied documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<BatchReport>,
}

impl RunSummary {
    /// Whether any artifact group failed to write.
    #[must_use]
    pub fn write_failed(&self) -> bool {
        self.artifacts.iter().any(|outcome| !outcome.succeeded())
    }

    /// Whether any validated document, generated or external, raised an error.
    #[must_use]
    pub fn validation_failed(&self) -> bool {
        let generated = self
            .artifacts
            .iter()
            .flat_map(|outcome| &outcome.reports)
            .any(|report| !report.passed());
        let external = self.validation.as_ref().is_some_and(|batch| !batch.passed);
        generated || external
    }

    /// Whether the run succeeded.
    #[must_use]
    pub fn passed(&self) -> bool {
        !self.write_failed() && !self.validation_failed()
    }

    /// Every file written by the run.
    pub fn written(&self) -> impl Iterator<Item = &PathBuf> {
        self.artifacts.iter().flat_map(|outcome| &outcome.written)
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    Ok(lexical_normalize(&std::path::absolute(path)?))
}

/// Items gathered from the walk, before merging.
struct Gathered {
    walked: Vec<SiteItem>,
    manual: Vec<SiteItem>,
    discovered: Vec<SiteItem>,
    canonical_overrides: usize,
    discovery_capped: bool,
}

fn gather(
    config: &SiteConfig,
    walker: &FileWalker,
    files: &[WalkedFile],
    resolver: &TimestampResolver,
) -> Gathered {
    let features = config.features;
    let known: HashSet<String> = files.iter().map(|file| file.url.clone()).collect();
    let mut discoverer = LinkDiscoverer::new(
        walker.clone(),
        config.base_url.clone(),
        config.limits.max_discovered,
        known,
    );
    let mut walked = Vec::with_capacity(files.len());
    let mut canonical_overrides = 0;

    for file in files {
        let mut url = file.url.clone();

        if (features.canonical || features.discover_links) && is_html_like(&file.path) {
            match scan_page(&file.path) {
                Ok(links) => {
                    if features.canonical {
                        if let Some(canonical) = links.canonical.as_deref().and_then(|href| {
                            resolve_canonical(href, &file.path, &config.root, &config.base_url)
                        }) {
                            debug!("Canonical {canonical} replaces {url}");
                            url = canonical;
                            canonical_overrides += 1;
                        }
                    }
                    if features.discover_links {
                        discoverer.offer(&file.path, &links.anchors);
                    }
                },
                Err(e) if e.is_fatal() => warn!(category = e.category(), "{e}"),
                Err(e) => debug!(category = e.category(), "{e}"),
            }
        }

        walked.push(SiteItem {
            url,
            lastmod: resolver.for_file(&file.path),
            changefreq: config.changefreq,
            priority: config.priority,
        });
    }

    let discovery_capped = discoverer.cap_reached();
    let discovered = discoverer
        .finish()
        .into_iter()
        .map(|(url, candidate)| {
            debug!("Adding {url} linked as {}", candidate.href);
            SiteItem {
                url,
                lastmod: resolver.for_file(&candidate.resolved_path),
                changefreq: config.changefreq,
                priority: config.priority,
            }
        })
        .collect();

    let manual = config
        .additional_urls
        .iter()
        .map(|url| SiteItem {
            url: url.clone(),
            lastmod: resolver.for_unbacked(),
            changefreq: config.changefreq,
            priority: config.priority,
        })
        .collect();

    Gathered {
        walked,
        manual,
        discovered,
        canonical_overrides,
        discovery_capped,
    }
}

/// Run `task` on the blocking pool. A panic inside it resumes on the caller.
async fn join_blocking<T, F>(what: &str, task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(value) => Ok(value),
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(Error::Other(format!("{what} task failed: {e}"))),
    }
}

/// Run generation and validation with `git` as the history source.
pub async fn run(config: SiteConfig, warnings: Vec<String>) -> Result<RunSummary> {
    let generated_at = Utc::now();
    let resolver = TimestampResolver::new(config.lastmod, generated_at);
    run_with(config, warnings, resolver, generated_at).await
}

/// Run generation and validation with an explicit timestamp resolver.
///
/// The walk and page scans (file reads, HTML parsing, `git log`) run on the
/// blocking pool.
#[instrument(skip_all, fields(root = %config.root.display(), base = %config.base_url))]
pub async fn run_with(
    mut config: SiteConfig,
    mut warnings: Vec<String>,
    resolver: TimestampResolver,
    generated_at: DateTime<Utc>,
) -> Result<RunSummary> {
    for warning in &warnings {
        warn!("{warning}");
    }
    config.root = absolutize(&config.root)?;
    config.output.dir = absolutize(&config.output.dir)?;

    let walker = FileWalker::new(
        &config.root,
        &config.include,
        &config.exclude,
        &config.exclude_extensions,
    )?
    .exclude_also(&artifact_globs(&config))?;

    let (config, walk, gathered) = join_blocking("site scan", move || {
        let walk = walker.walk(&config.base_url);
        info!(files = walk.files.len(), skipped = walk.skipped, "Walked site");
        let gathered = gather(&config, &walker, &walk.files, &resolver);
        (config, walk, gathered)
    })
    .await?;

    if gathered.discovery_capped {
        let limit = Error::LimitExceeded(format!(
            "link discovery stopped at {} pages",
            config.limits.max_discovered
        ));
        warnings.push(limit.to_string());
    }

    let manual_count = gathered.manual.len();
    let discovered_count = gathered.discovered.len();
    let exclude = ExcludeMatcher::new(&config.exclude_urls)?;
    let collection = collect(
        gathered.walked,
        gathered.manual,
        gathered.discovered,
        &exclude,
        config.limits.max_total,
    );
    if collection.stats.capped > 0 {
        let limit = Error::LimitExceeded(format!(
            "total cap of {} items reached; {} discovered pages not added",
            config.limits.max_total, collection.stats.capped
        ));
        warn!("{limit}");
        warnings.push(limit.to_string());
    }
    info!(
        items = collection.items.len(),
        canonical = gathered.canonical_overrides,
        discovered = discovered_count,
        "Collection complete"
    );

    if collection.items.is_empty() && (config.features.xml || config.features.txt) {
        let message = "no URLs were collected; writing an empty sitemap".to_string();
        warn!("{message}");
        warnings.push(message);
    }

    let policy = ValidationPolicy::from_limits(&config.limits, config.features.strict);
    let plan = build_plan(&collection.items, &config, &generated_at);
    let chunks = plan.chunks;
    let artifacts = execute(plan, config.features.gzip, policy).await;

    let validation = if config.validate.is_empty() {
        None
    } else {
        let paths = config.validate.clone();
        let batch = join_blocking("validation", move || validate_files(&paths, &policy)).await?;
        Some(batch)
    };

    Ok(RunSummary {
        generated_at,
        walked: walk.files.len(),
        skipped: walk.skipped,
        canonical_overrides: gathered.canonical_overrides,
        manual: manual_count,
        discovered: discovered_count,
        items: collection.items.len(),
        chunks,
        collect: collection.stats,
        warnings,
        artifacts,
        validation,
    })
}
