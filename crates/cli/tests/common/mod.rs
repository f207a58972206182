//! Common utilities for integration tests

pub mod cli;

pub use cli::{ChronCommand, CommandResult};

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated home, workspace tree, config file and cache directory
pub struct TestEnv {
    _temp: TempDir,
    pub home: PathBuf,
    pub config: PathBuf,
    pub cache_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let home = temp.path().join("home");
        let cache_dir = temp.path().join("cache");
        fs::create_dir_all(&home).unwrap();

        Self {
            config: temp.path().join("config.toml"),
            home,
            cache_dir,
            _temp: temp,
        }
    }

    /// Create an (empty JSON) workspace file below the home directory
    pub fn touch(&self, rel: &str) -> PathBuf {
        let path = self.home.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{}").unwrap();
        path
    }

    /// Write the config file
    pub fn write_config(&self, content: &str) {
        fs::write(&self.config, content).unwrap();
    }

    /// Config scanning the test home only
    pub fn write_default_config(&self) {
        self.write_config(&format!("roots = [{:?}]\n", self.home.to_string_lossy()));
    }

    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir.join("workspace-files-cache.json")
    }

    /// `chron` with this environment's config and cache wired in
    pub fn command(&self, args: &[&str]) -> ChronCommand {
        let mut cmd = ChronCommand::new(&self.home);
        cmd.args(args)
            .args(&["--config", path_str(&self.config)])
            .args(&["--cache-dir", path_str(&self.cache_dir)])
            .env("HOME", path_str(&self.home))
            .env("RUST_LOG", "warn");
        cmd
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}
