//! Version to local path resolution.
//!
//! Pure lookups over the read-only catalog: no I/O, safe to share across
//! fetch tasks without synchronisation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::{VersionCatalog, ISO_URL_KEY};
use crate::error::StoreError;
use crate::url_model;

/// Maps (version, asset key) to `data_dir/<basename of the asset URL>`.
#[derive(Debug, Clone)]
pub struct PathResolver {
    data_dir: PathBuf,
    catalog: Arc<VersionCatalog>,
}

impl PathResolver {
    pub fn new(data_dir: impl Into<PathBuf>, catalog: Arc<VersionCatalog>) -> Self {
        Self {
            data_dir: data_dir.into(),
            catalog,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Local path of the live ISO for `version`.
    pub fn resolve(&self, version: &str) -> Result<PathBuf, StoreError> {
        self.resolve_asset(version, ISO_URL_KEY)
    }

    /// Local path of the asset stored under `key` for `version`.
    pub fn resolve_asset(&self, version: &str, key: &str) -> Result<PathBuf, StoreError> {
        let url = self.catalog.asset_url(version, key)?;
        let name = url_model::basename(url).ok_or_else(|| StoreError::InvalidAssetUrl {
            version: version.to_string(),
            url: url.to_string(),
        })?;
        Ok(self.data_dir.join(name))
    }
}
