//! Writing, compressing and re-validating sitemap artifacts.
//!
//! Work is grouped by artifact type (XML, TXT, index). Each group is an ordered
//! task list that runs on its own tokio task: write a document, then its gzip
//! copy, then the next document, and finally validate what was written. Groups
//! share nothing, so a failed write only fails its own group.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument};

use crate::chunk::plan_files;
use crate::config::SiteConfig;
use crate::normalize::{join, url_for_path};
use crate::render::{IndexEntry, gzip, render_index, render_txt, render_urlset};
use crate::types::SiteItem;
use crate::validate::{DocumentKind, FileReport, ValidationPolicy, validate_content};
use crate::{Error, Result};

/// One rendered document awaiting its write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Destination path.
    pub path: PathBuf,
    /// Rendered text.
    pub content: String,
}

/// Ordered documents of one artifact type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactGroup {
    /// Artifact type.
    pub kind: DocumentKind,
    /// Documents, written in order.
    pub documents: Vec<Document>,
}

/// Everything a run will write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitPlan {
    /// Groups in XML, TXT, index order.
    pub groups: Vec<ArtifactGroup>,
    /// Number of chunks the collection was split into.
    pub chunks: usize,
}

/// Result of executing one artifact group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactOutcome {
    /// Artifact type.
    pub kind: DocumentKind,
    /// Files written successfully, gzip copies included.
    pub written: Vec<PathBuf>,
    /// Write failure that stopped the group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Validation reports for the written documents.
    pub reports: Vec<FileReport>,
}

impl ArtifactOutcome {
    /// Whether every document in the group was written.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// URL under which a file in the output directory is served.
fn served_url(config: &SiteConfig, file_name: &str) -> String {
    let path = config.output.dir.join(file_name);
    if config.output.dir.starts_with(&config.root) {
        url_for_path(&config.base_url, &config.root, &path)
    } else {
        join(&config.base_url, file_name)
    }
}

fn index_entries(config: &SiteConfig, names: &[String], at: &DateTime<Utc>) -> Vec<IndexEntry> {
    names
        .iter()
        .map(|name| IndexEntry {
            loc: served_url(config, name),
            lastmod: Some(*at),
        })
        .collect()
}

/// Render every document for the frozen `items`.
#[must_use]
pub fn build_plan(items: &[SiteItem], config: &SiteConfig, generated_at: &DateTime<Utc>) -> EmitPlan {
    let dir = &config.output.dir;
    let max = config.limits.max_per_file;
    let mut plan = EmitPlan::default();
    let mut referenced: Vec<String> = Vec::new();

    if config.features.xml {
        let files = plan_files(items, max, &config.output.xml_name);
        plan.chunks = files.len();
        referenced = files.iter().map(|file| file.name.clone()).collect();
        plan.groups.push(ArtifactGroup {
            kind: DocumentKind::Xml,
            documents: files
                .iter()
                .map(|file| Document {
                    path: dir.join(&file.name),
                    content: render_urlset(file.items, generated_at),
                })
                .collect(),
        });
    }

    if config.features.txt {
        let files = plan_files(items, max, &config.output.txt_name);
        if referenced.is_empty() {
            plan.chunks = files.len();
            referenced = files.iter().map(|file| file.name.clone()).collect();
        }
        plan.groups.push(ArtifactGroup {
            kind: DocumentKind::Txt,
            documents: files
                .iter()
                .map(|file| Document {
                    path: dir.join(&file.name),
                    content: render_txt(file.items),
                })
                .collect(),
        });
    }

    if referenced.len() > 1 {
        let entries = index_entries(config, &referenced, generated_at);
        plan.groups.push(ArtifactGroup {
            kind: DocumentKind::Index,
            documents: vec![Document {
                path: dir.join(&config.output.index_name),
                content: render_index(&entries, generated_at),
            }],
        });
    }

    plan
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

async fn write_artifact(path: &Path, content: Vec<u8>) -> Result<()> {
    tokio::fs::write(path, content)
        .await
        .map_err(|source| Error::Artifact {
            path: path.to_path_buf(),
            source,
        })
}

async fn ensure_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| Error::Artifact {
            path: dir.to_path_buf(),
            source,
        })
}

async fn write_document(document: &Document, compress: bool, written: &mut Vec<PathBuf>) -> Result<()> {
    write_artifact(&document.path, document.content.clone().into_bytes()).await?;
    written.push(document.path.clone());

    if compress {
        let raw = document.content.clone().into_bytes();
        let compressed = tokio::task::spawn_blocking(move || gzip(&raw))
            .await
            .map_err(|e| Error::Render(format!("gzip task failed: {e}")))??;
        let path = gz_path(&document.path);
        write_artifact(&path, compressed).await?;
        written.push(path);
    }
    Ok(())
}

/// Run one group: ordered writes, then validation of what was written.
async fn run_group(group: ArtifactGroup, compress: bool, policy: ValidationPolicy) -> ArtifactOutcome {
    let mut written = Vec::new();
    let mut failure = None;
    let mut completed = Vec::new();

    for document in &group.documents {
        let prepared = match document.path.parent() {
            Some(dir) => ensure_dir(dir).await,
            None => Ok(()),
        };
        let result = match prepared {
            Ok(()) => write_document(document, compress, &mut written).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => completed.push(document),
            Err(e) => {
                error!(category = e.category(), "{} artifact failed: {e}", group.kind);
                failure = Some(e.to_string());
                break;
            },
        }
    }

    let reports = completed
        .into_iter()
        .map(|document| validate_content(&document.path, &document.content, group.kind, &policy))
        .collect();

    ArtifactOutcome {
        kind: group.kind,
        written,
        error: failure,
        reports,
    }
}

/// Execute the plan, one concurrent task per artifact type.
///
/// Outcomes come back in plan order regardless of completion order.
#[instrument(skip_all, fields(groups = plan.groups.len()))]
pub async fn execute(plan: EmitPlan, compress: bool, policy: ValidationPolicy) -> Vec<ArtifactOutcome> {
    let mut tasks = JoinSet::new();
    let kinds: Vec<DocumentKind> = plan.groups.iter().map(|group| group.kind).collect();

    for (position, group) in plan.groups.into_iter().enumerate() {
        tasks.spawn(async move { (position, run_group(group, compress, policy).await) });
    }

    let mut outcomes: Vec<Option<ArtifactOutcome>> = vec![None; kinds.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((position, outcome)) => {
                debug!(kind = %outcome.kind, files = outcome.written.len(), "Artifact group finished");
                outcomes[position] = Some(outcome);
            },
            Err(e) => error!("Artifact task panicked: {e}"),
        }
    }

    let outcomes: Vec<ArtifactOutcome> = outcomes
        .into_iter()
        .zip(kinds)
        .map(|(outcome, kind)| {
            outcome.unwrap_or_else(|| ArtifactOutcome {
                kind,
                written: Vec::new(),
                error: Some("artifact task did not complete".to_string()),
                reports: Vec::new(),
            })
        })
        .collect();

    info!(
        written = outcomes.iter().map(|o| o.written.len()).sum::<usize>(),
        failed = outcomes.iter().filter(|o| !o.succeeded()).count(),
        "Artifacts emitted"
    );
    outcomes
}

/// Root-relative globs matching every artifact this configuration can write.
///
/// Empty when the output directory is outside the root.
#[must_use]
pub fn artifact_globs(config: &SiteConfig) -> Vec<String> {
    let Ok(rel_dir) = config.output.dir.strip_prefix(&config.root) else {
        return Vec::new();
    };
    let prefix: String = rel_dir
        .components()
        .map(|c| format!("{}/", globset::escape(&c.as_os_str().to_string_lossy())))
        .collect();

    let mut globs = Vec::new();
    for name in [
        &config.output.xml_name,
        &config.output.txt_name,
        &config.output.index_name,
    ] {
        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{ext}")),
            _ => (name.as_str(), String::new()),
        };
        let stem = globset::escape(stem);
        let ext = globset::escape(&ext);
        globs.push(format!("{prefix}{stem}{ext}"));
        globs.push(format!("{prefix}{stem}{ext}.gz"));
        globs.push(format!("{prefix}{stem}-[0-9]*{ext}"));
        globs.push(format!("{prefix}{stem}-[0-9]*{ext}.gz"));
    }
    globs
}
