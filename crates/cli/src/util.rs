//! Shared formatting helpers for CLI output

use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Format a timestamp as relative time ("2 hours ago")
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    let Ok(elapsed) = Utc::now().signed_duration_since(ts).to_std() else {
        return "in the future".to_string();
    };
    let seconds = elapsed.as_secs();

    if seconds < 60 {
        format!("{} seconds ago", seconds)
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours ago", seconds / 3600)
    } else if seconds < 604800 {
        format!("{} days ago", seconds / 86400)
    } else {
        format!("{} weeks ago", seconds / 604800)
    }
}

/// Format a timestamp in local time ("2024-01-03 14:30:00")
pub fn format_absolute_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Format a duration compactly ("850ms", "2.4s", "1m 05s")
pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {:02}s", ms / 60_000, (ms % 60_000) / 1000)
    }
}

/// Sorted copy of a file list
pub fn sorted(files: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = files.to_vec();
    files.sort();
    files
}

/// Print one workspace file per line: name highlighted, parent dimmed
pub fn print_workspace_files(files: &[PathBuf]) {
    for file in sorted(files) {
        println!("  {}", format_workspace_file(&file));
    }
}

fn format_workspace_file(file: &Path) -> String {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file.parent() {
        Some(parent) => format!(
            "{} {}",
            name.cyan(),
            format!("({})", parent.display()).dimmed()
        ),
        None => name.cyan().to_string(),
    }
}

/// JSON array of path strings
pub fn paths_to_json(files: &[PathBuf]) -> serde_json::Value {
    serde_json::Value::Array(
        sorted(files)
            .iter()
            .map(|f| serde_json::Value::String(f.to_string_lossy().into_owned()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(850)), "850ms");
        assert_eq!(format_duration(Duration::from_millis(2400)), "2.4s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 05s");
    }

    #[test]
    fn test_format_relative_time() {
        let now = Utc::now();
        assert!(format_relative_time(now - chrono::Duration::seconds(5)).ends_with("seconds ago"));
        assert_eq!(
            format_relative_time(now - chrono::Duration::hours(3)),
            "3 hours ago"
        );
        assert_eq!(
            format_relative_time(now + chrono::Duration::hours(1)),
            "in the future"
        );
    }

    #[test]
    fn test_paths_to_json_is_sorted() {
        let json = paths_to_json(&[PathBuf::from("/b.code-workspace"), PathBuf::from("/a.code-workspace")]);
        assert_eq!(json, serde_json::json!(["/a.code-workspace", "/b.code-workspace"]));
    }
}
