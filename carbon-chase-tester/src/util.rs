use anyhow::{Context, Result};
use chrono::Utc;
use std::{fs, path::Path, path::PathBuf};

use crate::logic::ScenarioResult;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// UTC timestamp stamped on generated reports.
pub fn report_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn artifacts_dir(base: &Path, scenario: &str, seed: u64) -> PathBuf {
    let ts = Utc::now().format("%Y%m%dT%H%M%S");
    let slug: String = scenario
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    base.join(slug).join(format!("seed-{seed}")).join(ts.to_string())
}

/// Dump a failed scenario result and its failure lines under `dir`.
pub fn write_failure_artifacts(dir: &Path, result: &ScenarioResult) -> Result<()> {
    fs::create_dir_all(dir).context("creating artifacts dir")?;

    let payload = serde_json::to_vec_pretty(result).context("serializing scenario result")?;
    fs::write(dir.join("result.json"), payload).context("writing result.json")?;
    fs::write(dir.join("failures.txt"), result.failures.join("\n"))
        .context("writing failures.txt")?;

    Ok(())
}
