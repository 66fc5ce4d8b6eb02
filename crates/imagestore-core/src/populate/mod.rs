//! Concurrent population of the data directory.
//!
//! One blocking task per catalog version, no concurrency limit (catalogs hold
//! tens of entries at most). A task resolves its destination, returns early
//! when the file already exists, and otherwise fetches the version's ISO.
//! Every task is joined; the first failure to complete is the one `populate`
//! reports, and the others still run to completion.
//!
//! A destination is claimed for the duration of its fetch; a second task for
//! the same path (a concurrent populate on a `Store` clone, or two versions
//! sharing a file name) fails with `AlreadyFetching` instead of racing on the
//! `.part` file. The claim is per process only.

mod inflight;
mod report;

pub(crate) use inflight::InFlight;

pub use report::{Outcome, PopulateReport};

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::catalog::{VersionCatalog, ISO_URL_KEY};
use crate::control::CancelToken;
use crate::error::StoreError;
use crate::fetch::Fetcher;
use crate::resolver::PathResolver;

/// Runs one fetch task per version and waits for all of them.
/// Fails early only if the data directory cannot be created.
pub(crate) async fn run(
    catalog: &Arc<VersionCatalog>,
    resolver: &PathResolver,
    fetcher: Fetcher,
    inflight: &InFlight,
    cancel: &CancelToken,
) -> Result<PopulateReport, StoreError> {
    let data_dir = resolver.data_dir();
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| StoreError::io(data_dir, e))?;

    let mut join_set = JoinSet::new();
    for version in catalog.versions() {
        let version = version.to_string();
        let catalog = Arc::clone(catalog);
        let resolver = resolver.clone();
        let inflight = inflight.clone();
        let cancel = cancel.clone();
        join_set.spawn_blocking(move || {
            let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
                populate_one(&version, &catalog, &resolver, &fetcher, &inflight, &cancel)
            }))
            .unwrap_or_else(|panic| {
                Err(StoreError::TaskFailed {
                    version: version.clone(),
                    reason: panic_message(panic.as_ref()),
                })
            });
            (version, result)
        });
    }

    let mut report = PopulateReport::default();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((version, result)) => {
                if let Err(e) = &result {
                    tracing::error!(version = %version, error = %e, "populate task failed");
                }
                report.record(version, result);
            }
            Err(e) => tracing::error!(error = %e, "populate task join failed"),
        }
    }

    // Only reachable if the runtime dropped a task without running it.
    for version in catalog.versions() {
        if report.outcome(version).is_none() {
            report.record(
                version.to_string(),
                Err(StoreError::TaskFailed {
                    version: version.to_string(),
                    reason: "task did not complete".to_string(),
                }),
            );
        }
    }

    tracing::info!(
        versions = report.len(),
        downloaded = report.downloaded(),
        failed = report.failures().count(),
        "populate finished"
    );
    Ok(report)
}

fn populate_one(
    version: &str,
    catalog: &VersionCatalog,
    resolver: &PathResolver,
    fetcher: &Fetcher,
    inflight: &InFlight,
    cancel: &CancelToken,
) -> Result<Outcome, StoreError> {
    if cancel.is_cancelled() {
        return Err(StoreError::Cancelled);
    }
    let dest = resolver.resolve(version)?;
    let _claim = inflight
        .claim(&dest)
        .ok_or_else(|| StoreError::AlreadyFetching { path: dest.clone() })?;

    // Existence is the only idempotence check; contents are trusted.
    if dest.try_exists().map_err(|e| StoreError::io(&dest, e))? {
        tracing::debug!(version, dest = %dest.display(), "image already present");
        return Ok(Outcome::AlreadyPresent);
    }

    let url = catalog.asset_url(version, ISO_URL_KEY)?;
    tracing::info!(version, url, dest = %dest.display(), "downloading iso");
    let bytes = fetcher.fetch(url, &dest, cancel)?;
    tracing::info!(version, bytes, "finished downloading");
    Ok(Outcome::Downloaded { bytes })
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked".to_string()
    }
}
