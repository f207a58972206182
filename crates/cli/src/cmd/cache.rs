//! Scan cache inspection
//!
//! The cache holds one record: the last scan result, keyed by the signature of
//! the configuration that produced it.

use super::Globals;
use crate::util;
use ::cache::ResultCache;
use anyhow::{Context, Result};
use chronicle_core::paths::home_dir;
use chronicle_core::Platform;
use owo_colors::OwoColorize;
use scanner::ScanPlan;

/// Show the cached record and whether it matches the current configuration
pub async fn run_show(globals: &Globals) -> Result<()> {
    let cache = globals.cache()?;
    let record = cache
        .read_record()
        .await
        .context("Failed to read scan cache")?;

    let Some(record) = record else {
        println!("{}", "No cached scan".dimmed());
        println!("  {}", "Tip: run 'chron scan' to create one".dimmed());
        return Ok(());
    };

    let plan = ScanPlan::build(&globals.settings(), &Platform::current(), home_dir().as_deref());
    let current = record.matches(&plan.signature, &plan.platform);

    println!("{}", "Scan Cache".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("File:        {}", cache.file_path().display().to_string().cyan());
    println!("Signature:   {}", record.signature.to_hex().yellow());
    println!("Platform:    {}", record.platform);
    println!(
        "Saved:       {} ({})",
        util::format_relative_time(record.saved_at),
        util::format_absolute_time(record.saved_at).dimmed()
    );
    print!("Status:      ");
    if current {
        println!("{}", "Matches current configuration ✓".green());
    } else {
        println!("{}", "Stale (configuration changed)".yellow());
    }
    if record.partial {
        println!("             {}", "Partial result (scan stopped early)".yellow());
    }
    println!();

    println!("Workspace files ({}):", record.files.len());
    if record.files.is_empty() {
        println!("  {}", "none".dimmed());
    } else {
        util::print_workspace_files(&record.files);
    }

    Ok(())
}

pub async fn run_clear(globals: &Globals) -> Result<()> {
    let cache = globals.cache()?;
    cache.clear().await.context("Failed to clear scan cache")?;
    println!("{} Cleared scan cache", "✓".green());
    Ok(())
}

pub fn run_path(globals: &Globals) -> Result<()> {
    let cache = globals.cache()?;
    let path = cache.file_path();
    println!("{}", path.display());
    if !path.exists() {
        println!("{}", "File does not exist yet. Run 'chron scan' to create it.".yellow());
    }
    Ok(())
}
