#![allow(clippy::unwrap_used)]

mod common;

use common::{read, smap_cmd, without_generated_comment, write_page};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

#[test]
fn generate_uses_canonical_and_path_urls() -> anyhow::Result<()> {
    let site = tempdir()?;
    write_page(
        site.path(),
        "index.html",
        r#"<html><head><link rel="canonical" href="https://example.com/home"></head></html>"#,
    );
    write_page(site.path(), "about.html", "<html><body>About</body></html>");

    smap_cmd()
        .args(["generate", "--base-url", "https://example.com", "--lastmod", "none"])
        .arg("--root")
        .arg(site.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 URLs in 1 file(s)"));

    let xml = read(site.path(), "sitemap.xml");
    assert_eq!(xml.matches("<url>").count(), 2);
    assert!(xml.contains("<loc>https://example.com/home</loc>"));
    assert!(xml.contains("<loc>https://example.com/about.html</loc>"));
    assert!(!xml.contains("index.html"));
    Ok(())
}

#[test]
fn generate_splits_into_chunks_with_index() -> anyhow::Result<()> {
    let site = tempdir()?;
    for i in 0..12 {
        write_page(site.path(), &format!("page-{i:02}.html"), "<html></html>");
    }

    smap_cmd()
        .args(["generate", "-u", "https://example.com", "--max-per-file", "5"])
        .arg("-r")
        .arg(site.path())
        .assert()
        .success();

    let counts: Vec<usize> = (1..=3)
        .map(|n| read(site.path(), &format!("sitemap-{n}.xml")).matches("<url>").count())
        .collect();
    assert_eq!(counts, vec![5, 5, 2]);
    assert!(!site.path().join("sitemap.xml").exists());

    let index = read(site.path(), "sitemap-index.xml");
    assert_eq!(index.matches("<sitemap>").count(), 3);
    assert_eq!(index.matches("<lastmod>").count(), 3);
    assert!(index.contains("<loc>https://example.com/sitemap-2.xml</loc>"));
    Ok(())
}

#[test]
fn generate_rejects_priority_before_writing() -> anyhow::Result<()> {
    let site = tempdir()?;
    write_page(site.path(), "index.html", "<html></html>");

    smap_cmd()
        .args(["generate", "-u", "https://example.com", "--priority", "1.5", "--txt"])
        .arg("-r")
        .arg(site.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("priority"));

    assert!(!site.path().join("sitemap.xml").exists());
    assert!(!site.path().join("sitemap.txt").exists());
    Ok(())
}

#[test]
fn generate_requires_base_url() -> anyhow::Result<()> {
    let site = tempdir()?;
    smap_cmd()
        .arg("generate")
        .arg("-r")
        .arg(site.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("base URL is required"));
    Ok(())
}

#[test]
fn generate_twice_is_deterministic() -> anyhow::Result<()> {
    let site = tempdir()?;
    write_page(site.path(), "index.html", "<html></html>");
    write_page(site.path(), "docs/guide.html", "<html></html>");
    write_page(site.path(), "docs/api.html", "<html></html>");

    let run = || {
        smap_cmd()
            .args(["generate", "-u", "https://example.com", "--lastmod", "none"])
            .arg("-r")
            .arg(site.path())
            .assert()
            .success();
        without_generated_comment(&read(site.path(), "sitemap.xml"))
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert!(!first.contains("sitemap.xml"));
    assert_eq!(first.matches("<url>").count(), 3);
    Ok(())
}

#[test]
fn generate_reads_settings_file() -> anyhow::Result<()> {
    let site = tempdir()?;
    write_page(site.path(), "index.html", "<html></html>");
    write_page(site.path(), "drafts/wip.html", "<html></html>");

    let config = site.path().join("smap.toml");
    fs::write(
        &config,
        format!(
            "base-url = \"https://example.com\"\nroot = {:?}\nexclude = [\"drafts/**\", \"*.toml\"]\ntxt = true\nlastmod = \"none\"\n",
            site.path().display().to_string()
        ),
    )?;

    smap_cmd()
        .arg("generate")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let txt = read(site.path(), "sitemap.txt");
    assert_eq!(txt.lines().collect::<Vec<_>>(), vec!["https://example.com/index.html"]);
    Ok(())
}

#[test]
fn generate_writes_gzip_copies() -> anyhow::Result<()> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let site = tempdir()?;
    write_page(site.path(), "index.html", "<html></html>");

    smap_cmd()
        .args(["generate", "-u", "https://example.com", "--gzip", "--txt"])
        .arg("-r")
        .arg(site.path())
        .assert()
        .success();

    for name in ["sitemap.xml", "sitemap.txt"] {
        let compressed = fs::read(site.path().join(format!("{name}.gz")))?;
        let mut decoded = String::new();
        GzDecoder::new(compressed.as_slice()).read_to_string(&mut decoded)?;
        assert_eq!(decoded, read(site.path(), name));
    }
    Ok(())
}

#[test]
fn generate_json_summary() -> anyhow::Result<()> {
    let site = tempdir()?;
    write_page(site.path(), "index.html", "<html></html>");
    write_page(site.path(), "about.html", "<html></html>");

    let out = smap_cmd()
        .args([
            "generate",
            "-u",
            "https://example.com",
            "--add-url",
            "/feed",
            "--format",
            "json",
        ])
        .arg("-r")
        .arg(site.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let summary: Value = serde_json::from_slice(&out)?;
    assert_eq!(summary["items"], 3);
    assert_eq!(summary["manual"], 1);
    assert_eq!(summary["chunks"], 1);
    for key in ["generatedAt", "walked", "collect", "artifacts", "warnings"] {
        assert!(summary.get(key).is_some(), "missing key: {key}");
    }
    Ok(())
}

#[test]
fn generate_fails_when_listed_document_is_invalid() -> anyhow::Result<()> {
    let site = tempdir()?;
    write_page(site.path(), "index.html", "<html></html>");
    let other = tempdir()?;
    let external = other.path().join("legacy.txt");
    fs::write(&external, "ftp://bad.example.com\n")?;

    smap_cmd()
        .args(["generate", "-u", "https://example.com", "--strict"])
        .arg("-r")
        .arg(site.path())
        .arg("--validate")
        .arg(&external)
        .assert()
        .code(3);

    assert!(site.path().join("sitemap.xml").exists());
    Ok(())
}

#[test]
fn generate_creates_missing_output_dir() -> anyhow::Result<()> {
    let site = tempdir()?;
    write_page(site.path(), "index.html", "<html></html>");
    let out = site.path().join("dist/maps");

    smap_cmd()
        .args(["generate", "-u", "https://example.com", "--lastmod", "none", "--txt"])
        .arg("-r")
        .arg(site.path())
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success();

    assert!(read(&out, "sitemap.xml").contains("<loc>https://example.com/index.html</loc>"));
    assert_eq!(read(&out, "sitemap.txt"), "https://example.com/index.html\n");
    Ok(())
}

#[test]
fn generate_empty_rerun_overwrites_previous_sitemap() -> anyhow::Result<()> {
    let site = tempdir()?;
    write_page(site.path(), "old.html", "<html></html>");
    let run = || {
        smap_cmd()
            .args(["generate", "-u", "https://example.com", "--lastmod", "none"])
            .arg("-r")
            .arg(site.path())
            .assert()
            .success();
    };

    run();
    assert!(read(site.path(), "sitemap.xml").contains("old.html"));

    fs::remove_file(site.path().join("old.html"))?;
    run();
    let xml = read(site.path(), "sitemap.xml");
    assert!(!xml.contains("old.html"));
    assert_eq!(xml.matches("<url>").count(), 0);
    Ok(())
}
