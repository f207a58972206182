//! CLI command implementations

pub mod cache;
pub mod config;
pub mod gate;
pub mod scan;

use anyhow::{Context, Result};
use ::cache::FileCache;
use chronicle_core::config as settings_file;
use chronicle_core::ScanSettings;
use std::path::PathBuf;

/// Options shared by every command
pub struct Globals {
    pub config: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
}

impl Globals {
    /// Config file in use (explicit or default location)
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => settings_file::config_file_path()
                .context("Could not determine config file path"),
        }
    }

    /// Settings, degraded to no roots if the file is unusable
    pub fn settings(&self) -> ScanSettings {
        settings_file::load_or_degraded(self.config.as_deref())
    }

    pub fn cache(&self) -> Result<FileCache> {
        match &self.cache_dir {
            Some(dir) => Ok(FileCache::at(dir)),
            None => FileCache::open_default().context("Could not determine cache directory"),
        }
    }
}
