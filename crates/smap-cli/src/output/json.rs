//! JSON output formatting

use anyhow::Result;
use smap_core::{BatchReport, RunSummary};

pub struct JsonFormatter;

impl JsonFormatter {
    /// Print a generation summary as JSON
    pub fn format_summary(summary: &RunSummary) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(summary)?);
        Ok(())
    }

    /// Print a validation batch as JSON
    pub fn format_batch(batch: &BatchReport) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(batch)?);
        Ok(())
    }
}
