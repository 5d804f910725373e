//! Text output formatting

use colored::Colorize;
use smap_core::{BatchReport, FileReport, Finding, RunSummary, Severity};

pub struct TextFormatter;

impl TextFormatter {
    /// Print a generation summary; info findings only appear when `verbose`
    pub fn format_summary(summary: &RunSummary, verbose: bool) {
        for line in summary_lines(summary, verbose) {
            println!("{line}");
        }
    }

    /// Print a validation batch with every finding
    pub fn format_batch(batch: &BatchReport) {
        for line in batch_lines(batch, true) {
            println!("{line}");
        }
    }
}

fn summary_lines(summary: &RunSummary, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();

    if summary.items == 0 {
        lines.push(format!("{} no URLs collected, wrote an empty sitemap", "!".yellow()));
    } else {
        lines.push(format!(
            "{} {} URLs in {} file(s)",
            "✓".green(),
            summary.items.to_string().bold(),
            summary.chunks
        ));
    }

    lines.push(format!(
        "  {} walked, {} skipped, {} canonical, {} manual, {} discovered",
        summary.walked, summary.skipped, summary.canonical_overrides, summary.manual, summary.discovered
    ));
    let stats = &summary.collect;
    if stats.duplicates + stats.excluded + stats.capped > 0 {
        lines.push(format!(
            "  {} duplicates, {} excluded, {} over the cap",
            stats.duplicates, stats.excluded, stats.capped
        ));
    }

    for artifact in &summary.artifacts {
        match &artifact.error {
            Some(error) => lines.push(format!(
                "{} {} sitemap failed: {error}",
                "✗".red(),
                artifact.kind
            )),
            None => {
                for path in &artifact.written {
                    lines.push(format!("  wrote {}", path.display().to_string().cyan()));
                }
            },
        }
        for report in &artifact.reports {
            lines.extend(report_lines(report, verbose));
        }
    }

    if let Some(batch) = &summary.validation {
        lines.push(String::new());
        lines.extend(batch_lines(batch, verbose));
    }

    for warning in &summary.warnings {
        lines.push(format!("{} {warning}", "warning:".yellow()));
    }

    lines
}

fn batch_lines(batch: &BatchReport, show_info: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for report in &batch.files {
        lines.extend(report_lines(report, show_info));
    }

    let verdict = if batch.passed {
        "passed".green().bold()
    } else {
        "failed".red().bold()
    };
    lines.push(format!(
        "Validation {verdict}: {} file(s), {} error(s), {} warning(s)",
        batch.files.len(),
        batch.error_count,
        batch.warning_count
    ));
    lines
}

fn report_lines(report: &FileReport, show_info: bool) -> Vec<String> {
    let marker = if report.passed() { "✓".green() } else { "✗".red() };
    let kind = report
        .kind
        .map_or_else(String::new, |kind| format!(" ({kind})"));
    let mut lines = vec![format!(
        "{marker} {}{kind}",
        report.path.display().to_string().bold()
    )];

    lines.extend(
        report
            .findings
            .iter()
            .filter(|finding| show_info || finding.severity != Severity::Info)
            .map(finding_line),
    );
    lines
}

fn finding_line(finding: &Finding) -> String {
    let label = match finding.severity {
        Severity::Info => "info".blue(),
        Severity::Warning => "warn".yellow(),
        Severity::Error => "error".red(),
    };
    format!("    {label}  {}", finding.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report(findings: Vec<Finding>) -> FileReport {
        FileReport {
            path: PathBuf::from("public/sitemap.xml"),
            exists: true,
            kind: Some(smap_core::DocumentKind::Xml),
            size: 120,
            findings,
        }
    }

    #[test]
    fn test_info_findings_hidden_unless_requested() {
        colored::control::set_override(false);
        let report = report(vec![
            Finding::info("structure: ok"),
            Finding::warning("priority: value 2.0 is outside 0.0-1.0"),
        ]);

        let quiet = report_lines(&report, false);
        assert_eq!(quiet.len(), 2);
        assert!(quiet[1].contains("warn"));

        let full = report_lines(&report, true);
        assert_eq!(full.len(), 3);
        assert!(full[1].contains("structure: ok"));
    }

    #[test]
    fn test_empty_run_still_lists_written_files() {
        colored::control::set_override(false);
        let summary = RunSummary {
            generated_at: Default::default(),
            walked: 0,
            skipped: 0,
            canonical_overrides: 0,
            manual: 0,
            discovered: 0,
            items: 0,
            chunks: 1,
            collect: Default::default(),
            warnings: vec!["no URLs were collected; writing an empty sitemap".to_string()],
            artifacts: vec![smap_core::emit::ArtifactOutcome {
                kind: smap_core::DocumentKind::Xml,
                written: vec![PathBuf::from("public/sitemap.xml")],
                error: None,
                reports: Vec::new(),
            }],
            validation: None,
        };

        let lines = summary_lines(&summary, false);
        assert!(lines[0].contains("wrote an empty sitemap"));
        assert!(lines.iter().any(|line| line == "  wrote public/sitemap.xml"));
        assert!(lines.last().is_some_and(|line| line.starts_with("warning:")));
    }

    #[test]
    fn test_batch_verdict_line() {
        colored::control::set_override(false);
        let batch = BatchReport::from_reports(vec![report(vec![Finding::error(
            "structure: missing </urlset>",
        )])]);

        let lines = batch_lines(&batch, false);
        let last = lines.last().map(String::as_str).unwrap_or_default();
        assert!(last.starts_with("Validation failed"));
        assert!(last.contains("1 error(s)"));
    }
}
