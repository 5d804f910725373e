#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// Create a configured `smap` command suitable for integration tests.
///
/// Clears the environment fallbacks so a developer's shell cannot leak into a test.
#[allow(dead_code)]
pub fn smap_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("smap"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env_remove("SMAP_BASE_URL");
    cmd.env_remove("SMAP_ROOT");
    cmd.env_remove("SMAP_OUTPUT_FORMAT");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Write `content` to `root/rel`, creating parent directories.
#[allow(dead_code)]
pub fn write_page(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Read `root/rel` as UTF-8.
#[allow(dead_code)]
pub fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

/// Document text without the generation timestamp comment.
#[allow(dead_code)]
pub fn without_generated_comment(xml: &str) -> String {
    xml.lines()
        .filter(|line| !line.starts_with("<!-- Generated by smap"))
        .collect::<Vec<_>>()
        .join("\n")
}
