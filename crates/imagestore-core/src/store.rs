//! Public facade: catalog + resolver + populator + read accessor.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::VersionCatalog;
use crate::config::StoreConfig;
use crate::control::CancelToken;
use crate::error::StoreError;
use crate::fetch::{FetchOptions, Fetcher};
use crate::populate::{self, InFlight, PopulateReport};
use crate::resolver::PathResolver;

/// Local cache of boot images, one ISO per catalog version.
///
/// The catalog is fixed at construction. `populate` makes sure every version
/// has its ISO on disk; `base_file` and `have_version` are synchronous lookups
/// that never touch the network.
#[derive(Debug, Clone)]
pub struct Store {
    catalog: Arc<VersionCatalog>,
    resolver: PathResolver,
    fetcher: Fetcher,
    inflight: InFlight,
}

impl Store {
    /// Store over `catalog` writing into `data_dir`, with default fetch options.
    pub fn new(data_dir: impl Into<PathBuf>, catalog: VersionCatalog) -> Self {
        let catalog = Arc::new(catalog);
        for (name, versions) in catalog.basename_collisions() {
            tracing::warn!(
                file = %name,
                versions = ?versions,
                "versions share an image file name and will overwrite each other's cache entry"
            );
        }
        Self {
            resolver: PathResolver::new(data_dir, Arc::clone(&catalog)),
            catalog,
            fetcher: Fetcher::default(),
            inflight: InFlight::default(),
        }
    }

    /// Build from configuration. A malformed catalog override is a `Config`
    /// error and no store is produced.
    pub fn from_config(cfg: &StoreConfig) -> Result<Self, StoreError> {
        let catalog = cfg.catalog()?;
        Ok(Self::new(&cfg.data_dir, catalog).with_fetch_options(cfg.fetch_options()))
    }

    pub fn with_fetch_options(mut self, opts: FetchOptions) -> Self {
        self.fetcher = Fetcher::new(opts);
        self
    }

    /// Ensure every version's ISO exists locally. Returns the first task failure.
    ///
    /// Clones of a store share one set of in-progress destinations: a version
    /// already being fetched by a concurrent call fails with `AlreadyFetching`.
    /// Other processes using the same data directory are not coordinated with.
    pub async fn populate(&self) -> Result<(), StoreError> {
        self.populate_with_cancel(&CancelToken::new()).await
    }

    /// Like [`Store::populate`], aborting in-flight transfers when `cancel` trips.
    pub async fn populate_with_cancel(&self, cancel: &CancelToken) -> Result<(), StoreError> {
        self.populate_report(cancel).await?.into_result()
    }

    /// Populate and return every version's outcome instead of only the first error.
    pub async fn populate_report(&self, cancel: &CancelToken) -> Result<PopulateReport, StoreError> {
        populate::run(
            &self.catalog,
            &self.resolver,
            self.fetcher,
            &self.inflight,
            cancel,
        )
        .await
    }

    /// True iff `version` is in the catalog. Does not check the disk.
    pub fn have_version(&self, version: &str) -> bool {
        self.catalog.contains(version)
    }

    /// Local path of `version`'s ISO, whether or not it has been downloaded.
    pub fn base_path(&self, version: &str) -> Result<PathBuf, StoreError> {
        self.resolver.resolve(version)
    }

    /// Open `version`'s ISO for reading. The caller owns the handle.
    pub fn base_file(&self, version: &str) -> Result<File, StoreError> {
        let path = self.resolver.resolve(version)?;
        File::open(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::FileNotFound { path },
            _ => StoreError::io(path, e),
        })
    }

    /// Whether `version`'s ISO is on disk.
    pub fn is_present(&self, version: &str) -> Result<bool, StoreError> {
        let path = self.resolver.resolve(version)?;
        path.try_exists().map_err(|e| StoreError::io(path, e))
    }

    pub fn catalog(&self) -> &VersionCatalog {
        &self.catalog
    }

    pub fn data_dir(&self) -> &Path {
        self.resolver.data_dir()
    }
}
