//! Destinations currently being fetched by this process.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Set of destination paths with a fetch in progress, shared by every clone
/// of a `Store`. Two tasks never write the same `.part` file at once.
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    paths: Arc<Mutex<HashSet<PathBuf>>>,
}

impl InFlight {
    /// Claim `dest`. Returns `None` if another task already holds it.
    pub(crate) fn claim(&self, dest: &Path) -> Option<InFlightGuard> {
        if !self.lock().insert(dest.to_path_buf()) {
            return None;
        }
        Some(InFlightGuard {
            paths: Arc::clone(&self.paths),
            dest: dest.to_path_buf(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        // The set stays consistent even if a holder panicked.
        self.paths.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Releases the claim on drop, including on error and panic paths.
pub(crate) struct InFlightGuard {
    paths: Arc<Mutex<HashSet<PathBuf>>>,
    dest: PathBuf,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.paths
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.dest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_fails_until_released() {
        let inflight = InFlight::default();
        let dest = Path::new("/images/a.iso");
        let guard = inflight.claim(dest).expect("first claim");
        assert!(inflight.claim(dest).is_none());
        assert!(inflight.clone().claim(dest).is_none());
        assert!(inflight.claim(Path::new("/images/b.iso")).is_some());
        drop(guard);
        assert!(inflight.claim(dest).is_some());
    }
}
