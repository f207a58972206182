//! Run one orchestrated scan and print the result

use super::Globals;
use crate::util;
use crate::ScanArgs;
use anyhow::{Context, Result};
use chronicle_core::ScanSettings;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use scanner::{
    HostContext, OrchestratorOptions, RefreshOutcome, ScanOrchestrator, Snapshot, SnapshotSource,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

pub async fn run(globals: &Globals, args: ScanArgs) -> Result<()> {
    let settings = apply_overrides(globals.settings(), &args);
    settings.validate().context("Invalid scan options")?;

    let cache = Arc::new(globals.cache()?);
    let (orchestrator, mut updates) =
        ScanOrchestrator::new(settings, cache, OrchestratorOptions::default());
    orchestrator.set_context(HostContext {
        has_primary_context: args.primary_context,
        has_marker_context: args.marker_context,
    });

    let spinner = if args.json {
        ProgressBar::hidden()
    } else {
        new_spinner()
    };

    // Mirror snapshots onto the spinner; remember the last cache preview
    let progress = spinner.clone();
    let listener = tokio::spawn(async move {
        let mut preview: Option<Snapshot> = None;
        while let Some(snapshot) = updates.recv().await {
            match snapshot.source {
                SnapshotSource::Cache => {
                    progress.set_message(format!(
                        "Showing {} cached workspace files while scanning...",
                        snapshot.files.len()
                    ));
                    preview = Some(snapshot);
                }
                SnapshotSource::Scan => {
                    progress.set_message(format!(
                        "Scanning... {} workspace files found",
                        snapshot.files.len()
                    ));
                }
            }
        }
        preview
    });

    let started = Instant::now();
    let outcome = if args.force {
        orchestrator.clear_cache_and_rescan().await
    } else {
        orchestrator.refresh_now().await
    };
    let elapsed = started.elapsed();
    debug!("Scan outcome: {:?}", outcome);
    let root_count = orchestrator.plan().roots.len();

    // Closing the snapshot stream ends the listener
    drop(orchestrator);
    spinner.finish_and_clear();
    let preview = listener.await.context("Snapshot listener failed")?;

    if args.json {
        print_json(&outcome, preview.as_ref())
    } else {
        print_human(&outcome, preview.as_ref(), root_count, elapsed);
        Ok(())
    }
}

/// Command-line flags take precedence over the config file
fn apply_overrides(mut settings: ScanSettings, args: &ScanArgs) -> ScanSettings {
    if !args.roots.is_empty() {
        settings.roots = args.roots.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings.scan_timeout_ms = timeout_ms;
    }
    if args.no_default_ignore {
        settings.use_default_ignore = false;
    }
    settings.extra_ignore.extend(args.ignore.iter().cloned());
    if args.no_nested_ignore {
        settings.respect_nested_ignore = false;
    }
    if args.no_stop_at_marker {
        settings.stop_at_marker = false;
    }
    settings
}

fn new_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Scanning...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_human(
    outcome: &RefreshOutcome,
    preview: Option<&Snapshot>,
    root_count: usize,
    elapsed: Duration,
) {
    match outcome {
        RefreshOutcome::Gated => {
            println!("{}", "Scanning is gated off for this context".yellow());
            match preview {
                Some(snapshot) => {
                    println!(
                        "{}",
                        format!(
                            "Showing {} cached workspace files{}",
                            snapshot.files.len(),
                            if snapshot.partial { " (partial)" } else { "" }
                        )
                        .dimmed()
                    );
                    println!();
                    util::print_workspace_files(&snapshot.files);
                }
                None => {
                    println!("  {}", "Tip: use --force to scan anyway".dimmed());
                }
            }
        }
        RefreshOutcome::Coalesced { generation } => {
            println!(
                "{}",
                format!("Scan {} was superseded by a newer request", generation).dimmed()
            );
        }
        RefreshOutcome::Scanned { files, partial, .. } => {
            if files.is_empty() {
                println!("{}", "No workspace files found".dimmed());
            } else {
                util::print_workspace_files(files);
                println!();
            }

            let summary = format!(
                "Found {} workspace files across {} roots in {}",
                files.len(),
                root_count,
                util::format_duration(elapsed)
            );
            if *partial {
                println!("{} {}", summary.bold(), "(partial: scan stopped early)".yellow());
                println!(
                    "  {}",
                    "Tip: raise scan_timeout_ms or narrow roots to scan everything".dimmed()
                );
            } else {
                println!("{} {}", "✓".green(), summary.bold());
            }
        }
    }
}

fn print_json(outcome: &RefreshOutcome, preview: Option<&Snapshot>) -> Result<()> {
    let value = match outcome {
        RefreshOutcome::Gated => serde_json::json!({
            "gated": true,
            "source": if preview.is_some() { "cache" } else { "none" },
            "files": util::paths_to_json(preview.map(|s| s.files.as_slice()).unwrap_or(&[])),
            "partial": preview.map(|s| s.partial).unwrap_or(false),
        }),
        RefreshOutcome::Coalesced { generation } => serde_json::json!({
            "gated": false,
            "source": "none",
            "generation": generation,
            "files": [],
            "partial": false,
        }),
        RefreshOutcome::Scanned {
            generation,
            files,
            partial,
            ..
        } => serde_json::json!({
            "gated": false,
            "source": "scan",
            "generation": generation,
            "files": util::paths_to_json(files),
            "partial": partial,
        }),
    };

    let text = serde_json::to_string_pretty(&value).context("Failed to encode scan result")?;
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ScanArgs {
        ScanArgs {
            roots: vec![],
            timeout_ms: None,
            no_default_ignore: false,
            ignore: vec![],
            no_nested_ignore: false,
            no_stop_at_marker: false,
            primary_context: false,
            marker_context: false,
            force: false,
            json: false,
        }
    }

    #[test]
    fn test_no_flags_keep_file_settings() {
        let settings = ScanSettings {
            roots: vec!["/srv".to_string()],
            extra_ignore: vec!["**/a/**".to_string()],
            ..ScanSettings::default()
        };
        assert_eq!(apply_overrides(settings.clone(), &args()), settings);
    }

    #[test]
    fn test_flags_override_settings() {
        let args = ScanArgs {
            roots: vec!["/code".to_string()],
            timeout_ms: Some(5),
            no_default_ignore: true,
            ignore: vec!["**/b/**".to_string()],
            no_nested_ignore: true,
            no_stop_at_marker: true,
            ..args()
        };
        let settings = ScanSettings {
            extra_ignore: vec!["**/a/**".to_string()],
            ..ScanSettings::default()
        };

        let merged = apply_overrides(settings, &args);
        assert_eq!(merged.roots, vec!["/code".to_string()]);
        assert_eq!(merged.scan_timeout_ms, 5);
        assert!(!merged.use_default_ignore);
        assert_eq!(merged.extra_ignore, vec!["**/a/**", "**/b/**"]);
        assert!(!merged.respect_nested_ignore);
        assert!(!merged.stop_at_marker);
    }
}
