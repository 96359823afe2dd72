//! The `scan-cache` command: scan and render the inventory report.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use console::style;
use hubcache_scan::{CacheReport, Severity};

use crate::table::tabulate;

pub fn run(cache_dir: Option<&Path>, verbosity: u8, json: bool) -> Result<()> {
    let t0 = Instant::now();
    let report = hubcache_scan::scan_cache_dir(cache_dir).context("cache scan failed")?;
    let elapsed = t0.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if verbosity == 0 {
        print_repo_table(&report);
    } else {
        print_revision_table(&report);
    }

    println!(
        "\nDone in {:.1}s. Scanned {} repo(s) for a total of {}.",
        elapsed.as_secs_f64(),
        report.repos.len(),
        style(report.size_on_disk_str()).red().bold(),
    );

    if !report.issues.is_empty() {
        let warnings = report
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count();
        let errors = report.issues.len() - warnings;
        let summary = format!(
            "Got {} warning(s) and {} error(s) while scanning.",
            warnings, errors
        );
        if verbosity >= 3 {
            println!("{}", style(summary).dim());
            for issue in &report.issues {
                let tag = match issue.severity {
                    Severity::Warning => style("warning").yellow(),
                    Severity::Error => style("error").red(),
                };
                println!("  {}: {}: {}", tag, issue.path.display(), issue.message);
            }
        } else {
            println!(
                "{}",
                style(format!("{summary} Use -vvv to print details.")).dim()
            );
        }
    }
    Ok(())
}

fn print_repo_table(report: &CacheReport) {
    let rows: Vec<Vec<String>> = report
        .repos
        .iter()
        .map(|repo| {
            vec![
                repo.repo_id.clone(),
                repo.repo_type.to_string(),
                format!("{:>12}", repo.size_on_disk_str()),
                repo.nb_blobs().to_string(),
                format_timestamp(repo.last_modified),
                repo.refs().keys().copied().collect::<Vec<_>>().join(", "),
                repo.repo_path.display().to_string(),
            ]
        })
        .collect();
    print!(
        "{}",
        tabulate(
            &rows,
            &[
                "REPO ID",
                "REPO TYPE",
                "SIZE ON DISK",
                "NB BLOBS",
                "LAST MODIFIED",
                "REFS",
                "LOCAL PATH",
            ],
        )
    );
}

fn print_revision_table(report: &CacheReport) {
    let rows: Vec<Vec<String>> = report
        .repos
        .iter()
        .flat_map(|repo| {
            repo.revisions.iter().map(|revision| {
                vec![
                    repo.repo_id.clone(),
                    repo.repo_type.to_string(),
                    revision.commit_hash.clone(),
                    format!("{:>12}", revision.size_on_disk_str()),
                    revision.nb_files().to_string(),
                    format_timestamp(revision.last_modified),
                    revision.refs.join(", "),
                    revision.snapshot_path.display().to_string(),
                ]
            })
        })
        .collect();
    print!(
        "{}",
        tabulate(
            &rows,
            &[
                "REPO ID",
                "REPO TYPE",
                "REVISION",
                "SIZE ON DISK",
                "NB FILES",
                "LAST MODIFIED",
                "REFS",
                "LOCAL PATH",
            ],
        )
    );
}

fn format_timestamp(unix_secs: u64) -> String {
    DateTime::<Utc>::from_timestamp(unix_secs as i64, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_unix_seconds_as_utc() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(1_700_000_000), "2023-11-14 22:13:20");
    }
}
