use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::VersionCatalog;
use crate::error::StoreError;
use crate::fetch::FetchOptions;

/// Environment variable overriding `data_dir`.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
/// Environment variable holding a JSON catalog override.
pub const VERSIONS_ENV: &str = "RHCOS_VERSIONS";

/// Store configuration loaded from `~/.config/imagestore/config.toml`,
/// then overridden by environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory the images are written to. Must be writable.
    pub data_dir: PathBuf,
    /// libcurl connect timeout in seconds (None = 30).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Abort a transfer stalled below 1 KiB/s for this many seconds (None = 60).
    #[serde(default)]
    pub low_speed_time_secs: Option<u64>,
    /// Catalog override as a TOML table: `[versions."4.8"] iso_url = "..."`.
    /// Replaces the built-in table entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<VersionCatalog>,
    /// Raw JSON catalog override from `RHCOS_VERSIONS`. Parsed when the store
    /// is built; takes precedence over `versions`.
    #[serde(skip)]
    pub versions_override: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            connect_timeout_secs: None,
            low_speed_time_secs: None,
            versions: None,
            versions_override: None,
        }
    }
}

impl StoreConfig {
    /// Apply environment overrides using `lookup` (normally `std::env::var`).
    /// Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|s| !s.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(json) = lookup(VERSIONS_ENV).filter(|s| !s.trim().is_empty()) {
            self.versions_override = Some(json);
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// The catalog this configuration selects: JSON override, else TOML table,
    /// else the built-in default.
    pub fn catalog(&self) -> Result<VersionCatalog, StoreError> {
        match (&self.versions_override, &self.versions) {
            (Some(json), _) => VersionCatalog::from_json(json).map_err(|e| match e {
                StoreError::Config { source, .. } => StoreError::config(VERSIONS_ENV, source),
                other => other,
            }),
            (None, Some(table)) => Ok(table.clone()),
            (None, None) => Ok(VersionCatalog::default()),
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        let mut opts = FetchOptions::default();
        if let Some(secs) = self.connect_timeout_secs {
            opts.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.low_speed_time_secs {
            opts.low_speed_time = Duration::from_secs(secs);
        }
        opts
    }
}

fn xdg_dirs() -> Result<xdg::BaseDirectories, StoreError> {
    xdg::BaseDirectories::with_prefix("imagestore").map_err(|e| StoreError::config("XDG directories", e))
}

pub fn config_path() -> Result<PathBuf, StoreError> {
    let path = xdg_dirs()?
        .place_config_file("config.toml")
        .map_err(|e| StoreError::config("config directory", e))?;
    Ok(path)
}

/// Default image directory: `~/.local/share/imagestore/images`.
pub fn default_data_dir() -> Result<PathBuf, StoreError> {
    Ok(xdg_dirs()?.get_data_home().join("images"))
}

/// Read and parse a config file. Does not apply environment overrides.
pub fn load_from(path: &Path) -> Result<StoreConfig, StoreError> {
    let data = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    toml::from_str(&data).map_err(|e| StoreError::config(path.display().to_string(), e))
}

/// Load configuration from disk, creating a default file if none exists,
/// then apply environment overrides.
pub fn load_or_init() -> Result<StoreConfig, StoreError> {
    let path = config_path()?;
    let mut cfg = if path.exists() {
        load_from(&path)?
    } else {
        let default_cfg = StoreConfig {
            data_dir: default_data_dir()?,
            ..StoreConfig::default()
        };
        let toml = toml::to_string_pretty(&default_cfg)
            .map_err(|e| StoreError::config("default config", e))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        fs::write(&path, toml).map_err(|e| StoreError::io(&path, e))?;
        tracing::info!("created default config at {}", path.display());
        default_cfg
    };
    cfg.apply_env();
    Ok(cfg)
}
