//! Per-item modification timestamps.

use std::fs;
use std::path::Path;
use std::process::Command;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::types::LastmodStrategy;

/// Source-control history lookup.
pub trait CommitHistory: Send + Sync {
    /// Time of the last commit touching `path`, if the path is tracked.
    fn last_commit_time(&self, path: &Path) -> Option<DateTime<Utc>>;
}

/// [`CommitHistory`] backed by the `git` executable.
///
/// Each lookup runs `git log -1 --format=%cI -- <file>` from the file's
/// directory, so the root does not need to be the repository top level.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHistory;

impl CommitHistory for GitHistory {
    fn last_commit_time(&self, path: &Path) -> Option<DateTime<Utc>> {
        let dir = path.parent()?;
        let file = path.file_name()?;
        let output = Command::new("git")
            .args(["log", "-1", "--format=%cI", "--"])
            .arg(file)
            .current_dir(dir)
            .output()
            .map_err(|e| debug!("git unavailable for {}: {e}", path.display()))
            .ok()?;

        if !output.status.success() {
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().next()?.trim();
        DateTime::parse_from_rfc3339(line)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }
}

/// Filesystem modification time of `path`.
#[must_use]
pub fn modified_time(path: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(DateTime::<Utc>::from)
        .ok()
}

/// Applies a [`LastmodStrategy`] to items.
///
/// The generation instant is captured once, so every item stamped under
/// `current` carries the same value.
pub struct TimestampResolver {
    strategy: LastmodStrategy,
    now: DateTime<Utc>,
    history: Box<dyn CommitHistory>,
}

impl std::fmt::Debug for TimestampResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimestampResolver")
            .field("strategy", &self.strategy)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl TimestampResolver {
    /// Resolver using `git` for history lookups.
    #[must_use]
    pub fn new(strategy: LastmodStrategy, now: DateTime<Utc>) -> Self {
        Self::with_history(strategy, now, Box::new(GitHistory))
    }

    /// Resolver with a custom history source.
    #[must_use]
    pub fn with_history(
        strategy: LastmodStrategy,
        now: DateTime<Utc>,
        history: Box<dyn CommitHistory>,
    ) -> Self {
        Self {
            strategy,
            now,
            history,
        }
    }

    /// Timestamp for an item backed by `path`.
    #[must_use]
    pub fn for_file(&self, path: &Path) -> Option<DateTime<Utc>> {
        match self.strategy {
            LastmodStrategy::Git => self
                .history
                .last_commit_time(path)
                .or_else(|| modified_time(path)),
            LastmodStrategy::Filemtime => modified_time(path),
            LastmodStrategy::Current => Some(self.now),
            LastmodStrategy::None => None,
        }
    }

    /// Timestamp for an item with no backing file.
    #[must_use]
    pub fn for_unbacked(&self) -> Option<DateTime<Utc>> {
        match self.strategy {
            LastmodStrategy::Current => Some(self.now),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    struct FixedHistory(Option<DateTime<Utc>>);

    impl CommitHistory for FixedHistory {
        fn last_commit_time(&self, _path: &Path) -> Option<DateTime<Utc>> {
            self.0
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_git_strategy_prefers_history() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.html");
        fs::write(&path, "x").unwrap();

        let committed = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        let resolver = TimestampResolver::with_history(
            LastmodStrategy::Git,
            now(),
            Box::new(FixedHistory(Some(committed))),
        );
        assert_eq!(resolver.for_file(&path), Some(committed));
    }

    #[test]
    fn test_git_strategy_falls_back_to_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.html");
        fs::write(&path, "x").unwrap();

        let resolver = TimestampResolver::with_history(
            LastmodStrategy::Git,
            now(),
            Box::new(FixedHistory(None)),
        );
        assert_eq!(resolver.for_file(&path), modified_time(&path));
        assert!(resolver.for_file(&path).is_some());
    }

    #[test]
    fn test_filemtime_missing_file() {
        let resolver = TimestampResolver::new(LastmodStrategy::Filemtime, now());
        assert_eq!(resolver.for_file(Path::new("/definitely/not/here.html")), None);
    }

    #[test]
    fn test_current_is_stable_across_items() {
        let resolver = TimestampResolver::new(LastmodStrategy::Current, now());
        assert_eq!(resolver.for_file(Path::new("a.html")), Some(now()));
        assert_eq!(resolver.for_file(Path::new("b.html")), Some(now()));
        assert_eq!(resolver.for_unbacked(), Some(now()));
    }

    #[test]
    fn test_none_strategy() {
        let resolver = TimestampResolver::new(LastmodStrategy::None, now());
        assert_eq!(resolver.for_file(Path::new("a.html")), None);
        assert_eq!(resolver.for_unbacked(), None);
    }

    #[test]
    fn test_unbacked_items_only_stamped_under_current() {
        let resolver = TimestampResolver::new(LastmodStrategy::Filemtime, now());
        assert_eq!(resolver.for_unbacked(), None);
    }
}
