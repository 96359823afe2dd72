//! The `plan-delete` command: dry-run deletion planning.
//!
//! Prints what an external deletion executor would have to remove and how
//! much space that frees. This command never deletes anything.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

pub fn run(cache_dir: Option<&Path>, revisions: &[String], json: bool) -> Result<()> {
    let report = hubcache_scan::scan_cache_dir(cache_dir).context("cache scan failed")?;
    let strategy = report.plan_deletion(revisions);

    if json {
        println!("{}", serde_json::to_string_pretty(&strategy)?);
        return Ok(());
    }

    println!("Deletion plan (dry-run, nothing will be removed):");
    for status in &strategy.requested {
        if status.found {
            println!("  {} {}", style("✔").green(), status.revision);
        } else {
            println!(
                "  {} {} {}",
                style("✘").red(),
                status.revision,
                style("(not found)").dim()
            );
        }
    }

    println!();
    if !strategy.repos.is_empty() {
        println!("  Repo folders to remove entirely:");
        for path in &strategy.repos {
            println!("    {}", path.display());
        }
    }
    if !strategy.snapshots.is_empty() {
        println!("  Snapshot directories to remove:");
        for path in &strategy.snapshots {
            println!("    {}", path.display());
        }
    }
    if !strategy.refs.is_empty() {
        println!("  Ref files to remove:");
        for path in &strategy.refs {
            println!("    {}", path.display());
        }
    }
    if !strategy.blobs.is_empty() {
        println!("  Blobs no longer referenced:");
        for path in &strategy.blobs {
            println!("    {}", path.display());
        }
    }

    for warning in &strategy.warnings {
        println!("  {} {}", style("warning:").yellow(), warning);
    }

    println!(
        "\nExpected freed size: {}.",
        style(strategy.expected_freed_size_str()).red().bold()
    );
    Ok(())
}
