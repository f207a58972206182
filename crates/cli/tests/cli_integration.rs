//! Integration tests for the chron binary
//!
//! Each test runs the real binary against a throwaway home directory, config
//! file and cache directory.

mod common;

use anyhow::Result;
use common::TestEnv;

#[test]
fn test_scan_json_lists_workspace_files() -> Result<()> {
    let env = TestEnv::new();
    env.write_default_config();
    let a = env.touch("code/app/app.code-workspace");
    env.touch("code/app/node_modules/dep/dep.code-workspace");
    let b = env.touch("notes/notes.code-workspace");

    let result = chron!(env, "scan", "--json").assert_success()?;
    let json = result.json()?;

    assert_eq!(json["source"], "scan");
    assert_eq!(json["partial"], false);
    assert_eq!(
        json["files"],
        serde_json::json!([a.to_string_lossy(), b.to_string_lossy()])
    );
    assert!(env.cache_file().exists());
    Ok(())
}

#[test]
fn test_gated_scan_shows_cached_files() -> Result<()> {
    let env = TestEnv::new();
    env.write_default_config();
    let a = env.touch("a/a.code-workspace");

    chron!(env, "scan", "--json").assert_success()?;

    env.write_config(&format!(
        "roots = [{:?}]\nscan_when_no_primary_context = false\n",
        env.home.to_string_lossy()
    ));
    let json = chron!(env, "scan", "--json").assert_success()?.json()?;

    assert_eq!(json["gated"], true);
    assert_eq!(json["source"], "cache");
    assert_eq!(json["files"], serde_json::json!([a.to_string_lossy()]));
    Ok(())
}

#[test]
fn test_force_scans_when_gated() -> Result<()> {
    let env = TestEnv::new();
    env.write_config(&format!(
        "roots = [{:?}]\nscan_when_no_primary_context = false\n",
        env.home.to_string_lossy()
    ));
    env.touch("a/a.code-workspace");

    let gated = chron!(env, "scan", "--json").assert_success()?.json()?;
    assert_eq!(gated["gated"], true);
    assert_eq!(gated["source"], "none");

    let forced = chron!(env, "scan", "--json", "--force").assert_success()?.json()?;
    assert_eq!(forced["source"], "scan");
    assert_eq!(forced["files"].as_array().map(Vec::len), Some(1));

    let with_folder = chron!(env, "scan", "--json", "--primary-context")
        .assert_success()?
        .json()?;
    assert_eq!(with_folder["gated"], false);
    Ok(())
}

#[test]
fn test_scan_flags_override_config() -> Result<()> {
    let env = TestEnv::new();
    env.write_default_config();
    env.touch("proj/proj.code-workspace");
    env.touch("proj/sub/sub.code-workspace");
    env.touch("skip/skip.code-workspace");

    let json = chron!(
        env,
        "scan",
        "--json",
        "--no-stop-at-marker",
        "--ignore",
        "**/skip/**"
    )
    .assert_success()?
    .json()?;

    assert_eq!(json["files"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn test_malformed_config_scans_nothing() -> Result<()> {
    let env = TestEnv::new();
    env.write_config("roots = 42\n");
    env.touch("a/a.code-workspace");

    let json = chron!(env, "scan", "--json").assert_success()?.json()?;
    assert_eq!(json["files"], serde_json::json!([]));
    assert!(!env.cache_file().exists());
    Ok(())
}

#[test]
fn test_invalid_timeout_flag_fails() -> Result<()> {
    let env = TestEnv::new();
    env.write_default_config();

    chron!(env, "scan", "--timeout-ms", "0").assert_failure()?;
    Ok(())
}

#[test]
fn test_cache_show_and_clear() -> Result<()> {
    let env = TestEnv::new();
    env.write_default_config();
    env.touch("a/a.code-workspace");

    let empty = chron!(env, "cache", "show").assert_success()?;
    assert!(empty.contains_stdout("No cached scan"));

    chron!(env, "scan").assert_success()?;
    let shown = chron!(env, "cache", "show").assert_success()?;
    assert!(shown.contains_stdout("Matches current configuration"));
    assert!(shown.contains_stdout("a.code-workspace"));

    chron!(env, "cache", "clear").assert_success()?;
    assert!(!env.cache_file().exists());

    let path = chron!(env, "cache", "path").assert_success()?;
    assert!(path.contains_stdout("workspace-files-cache.json"));
    Ok(())
}

#[test]
fn test_cache_show_detects_stale_record() -> Result<()> {
    let env = TestEnv::new();
    env.write_default_config();
    env.touch("a/a.code-workspace");
    chron!(env, "scan").assert_success()?;

    env.write_config(&format!(
        "roots = [{:?}]\nstop_at_marker = false\n",
        env.home.to_string_lossy()
    ));
    let shown = chron!(env, "cache", "show").assert_success()?;
    assert!(shown.contains_stdout("Stale"));
    Ok(())
}

#[test]
fn test_config_path_create_and_list() -> Result<()> {
    let env = TestEnv::new();

    let missing = chron!(env, "config", "path").assert_success()?;
    assert!(missing.contains_stdout("does not exist"));

    chron!(env, "config", "path", "--create").assert_success()?;
    assert!(env.config.exists());

    let listed = chron!(env, "config", "list").assert_success()?;
    assert!(listed.contains_stdout("scan_timeout_ms"));
    assert!(listed.contains_stdout("30000"));
    assert!(listed.contains_stdout("${userHome}"));
    Ok(())
}

#[test]
fn test_config_example_parses_back() -> Result<()> {
    let env = TestEnv::new();
    let example = chron!(env, "config", "example").assert_success()?;

    env.write_config(&example.stdout);
    let listed = chron!(env, "config", "list").assert_success()?;
    assert!(!listed.contains_stdout("Invalid"));
    Ok(())
}

#[test]
fn test_gate_truth_table() -> Result<()> {
    let env = TestEnv::new();

    let blocked = chron!(env, "gate", "--deny-without-primary").assert_success()?;
    assert!(blocked.contains_stdout("scan blocked"));

    let allowed = chron!(env, "gate").assert_success()?;
    assert!(allowed.contains_stdout("scan allowed"));

    let marker_blocked = chron!(
        env,
        "gate",
        "--primary-context",
        "--marker-context",
        "--deny-with-marker"
    )
    .assert_success()?;
    assert!(marker_blocked.contains_stdout("scan blocked"));

    let marker_allowed =
        chron!(env, "gate", "--primary-context", "--marker-context").assert_success()?;
    assert!(marker_allowed.contains_stdout("scan allowed"));
    Ok(())
}
