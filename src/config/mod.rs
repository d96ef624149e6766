// SPDX-License-Identifier: MPL-2.0
//! This module handles the tool's configuration, loaded from and saved to a
//! `settings.toml` file in the config directory (see [`crate::paths`]).
//!
//! # Examples
//!
//! ```no_run
//! use ts_catalog::catalog::DuplicatePolicy;
//! use ts_catalog::config::{self, Config};
//!
//! let mut config = config::load().unwrap_or_default();
//! config.language = Some("zh-CN".to_string());
//! config.duplicate_policy = Some(DuplicatePolicy::FirstWins);
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

use crate::catalog::DuplicatePolicy;
use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Preferred UI locale, e.g. `zh-CN`.
    pub language: Option<String>,
    #[serde(default)]
    pub duplicate_policy: Option<DuplicatePolicy>,
    /// Extra directories scanned for `.ts` catalogs.
    #[serde(default)]
    pub catalog_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub lint_missing_location: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: None,
            duplicate_policy: Some(DuplicatePolicy::default()),
            catalog_dirs: Vec::new(),
            lint_missing_location: Some(defaults::DEFAULT_LINT_MISSING_LOCATION),
        }
    }
}

impl Config {
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy.unwrap_or_default()
    }

    pub fn lint_missing_location(&self) -> bool {
        self.lint_missing_location
            .unwrap_or(defaults::DEFAULT_LINT_MISSING_LOCATION)
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    paths::get_app_config_dir().map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Reads a config file. Invalid TOML falls back to defaults with a warning.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(err) => {
            log::warn!("ignoring invalid config {}: {}", path.display(), err);
            Ok(Config::default())
        }
    }
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
