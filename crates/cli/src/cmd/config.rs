//! Configuration management command
//!
//! Provides CLI interface to view the scan configuration.

use super::Globals;
use anyhow::{Context, Result};
use chronicle_core::config as settings_file;
use owo_colors::OwoColorize;

/// List all configuration values
pub fn run_list(globals: &Globals) -> Result<()> {
    let config_path = globals.config_path()?;
    let config = settings_file::load_from(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    println!("{}", "Scan Configuration".bold());
    println!(
        "{}: {}\n",
        "Location".dimmed(),
        config_path.display().to_string().dimmed()
    );

    println!("{}", "[roots]".yellow());
    if config.roots.is_empty() {
        println!("  {}", "(none: scanning is disabled)".dimmed());
    }
    for root in &config.roots {
        println!("  {}", root);
    }

    println!("\n{}", "[scan]".yellow());
    println!(
        "  {} = {} {}",
        "scan_timeout_ms".cyan(),
        config.scan_timeout_ms,
        format!("({}s)", config.scan_timeout_ms as f64 / 1000.0).dimmed()
    );
    println!(
        "  {} = {} {}",
        "scan_update_interval_ms".cyan(),
        config.scan_update_interval_ms,
        if config.scan_update_interval_ms == 0 {
            "(every discovery)".dimmed().to_string()
        } else {
            format!("({}ms)", config.scan_update_interval_ms)
                .dimmed()
                .to_string()
        }
    );
    println!(
        "  {} = {}",
        "respect_nested_ignore".cyan(),
        config.respect_nested_ignore
    );
    println!("  {} = {}", "stop_at_marker".cyan(), config.stop_at_marker);

    println!("\n{}", "[ignore]".yellow());
    println!(
        "  {} = {}",
        "use_default_ignore".cyan(),
        config.use_default_ignore
    );
    println!("  {} = {:?}", "extra_ignore".cyan(), config.extra_ignore);

    println!("\n{}", "[gating]".yellow());
    println!(
        "  {} = {}",
        "scan_when_no_primary_context".cyan(),
        config.scan_when_no_primary_context
    );
    println!(
        "  {} = {}",
        "scan_when_marker_context".cyan(),
        config.scan_when_marker_context
    );

    if let Err(e) = config.validate() {
        println!("\n{} {}", "Invalid:".red().bold(), e);
        println!(
            "{}",
            "Scans will use an empty root set until this is fixed".yellow()
        );
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!("  scan_timeout_ms: 1-3,600,000");
    println!("  scan_update_interval_ms: 0-60,000 (0 = every discovery)");

    Ok(())
}

/// Show the config file path and optionally create it
pub fn run_path(globals: &Globals, create: bool) -> Result<()> {
    let config_path = globals.config_path()?;

    if create && !config_path.exists() {
        settings_file::save_to(&config_path, &Default::default())?;
        println!(
            "{} Created config file at: {}",
            "✓".green(),
            config_path.display()
        );
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!(
            "{}",
            "File does not exist. Use --create to create it.".yellow()
        );
    }

    Ok(())
}

/// Show example configuration
pub fn run_example() -> Result<()> {
    println!("{}", settings_file::example_config());
    Ok(())
}
