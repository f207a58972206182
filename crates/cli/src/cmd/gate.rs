//! Evaluate the scan gating policy for a given host context

use anyhow::Result;
use chronicle_core::{should_scan, GateInput};
use owo_colors::OwoColorize;

pub fn run(
    has_primary_context: bool,
    has_marker_context: bool,
    allow_without_primary_context: bool,
    allow_with_marker_context: bool,
) -> Result<()> {
    let input = GateInput {
        has_primary_context,
        has_marker_context,
        allow_without_primary_context,
        allow_with_marker_context,
    };

    if should_scan(input) {
        println!("{} scan allowed", "✓".green());
    } else {
        println!("{} scan blocked", "✗".red());
        if !has_primary_context && !allow_without_primary_context {
            println!("  {}", "no folder is open".dimmed());
        }
        if has_marker_context && !allow_with_marker_context {
            println!("  {}", "a workspace file is the active context".dimmed());
        }
    }

    Ok(())
}
