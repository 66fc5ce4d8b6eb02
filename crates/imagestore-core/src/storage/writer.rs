//! Sequential writer for `.part` download files.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// An in-progress download. Removed from disk on drop unless `finalize` succeeded.
pub struct PartFile {
    file: Option<File>,
    path: PathBuf,
    written: u64,
    finalized: bool,
}

impl PartFile {
    /// Create (or truncate) `<final_path>.part`.
    pub fn create(final_path: &Path) -> Result<Self, StoreError> {
        let path = super::part_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        Ok(PartFile {
            file: Some(file),
            path,
            written: 0,
            finalized: false,
        })
    }

    /// Reserve `size` bytes. On Linux tries `posix_fallocate` for real block
    /// allocation; falls back to `set_len` on failure or other platforms.
    pub fn preallocate(&mut self, size: u64) -> Result<(), StoreError> {
        let Some(file) = self.file.as_ref() else {
            return Ok(());
        };
        if size == 0 {
            return Ok(());
        }
        #[cfg(target_os = "linux")]
        {
            match libc::off_t::try_from(size) {
                Ok(len) => {
                    let r = unsafe { libc::posix_fallocate(file.as_raw_fd(), 0, len) };
                    if r == 0 {
                        return Ok(());
                    }
                    tracing::debug!(errno = r, "posix_fallocate failed, falling back to set_len");
                }
                Err(_) => tracing::debug!(size, "length exceeds off_t, skipping posix_fallocate"),
            }
        }
        file.set_len(size).map_err(|e| StoreError::io(&self.path, e))
    }

    /// Append `data` at the current end of the body.
    pub fn write(&mut self, data: &[u8]) -> Result<(), StoreError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| StoreError::io(&self.path, std::io::ErrorKind::BrokenPipe.into()))?;
        file.write_all(data)
            .map_err(|e| StoreError::io(&self.path, e))?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes appended so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sync, close and atomically rename onto `final_path`. Returns the byte count.
    pub fn finalize(mut self, final_path: &Path) -> Result<u64, StoreError> {
        if let Some(file) = self.file.take() {
            // Preallocation may have reserved more than was delivered.
            file.set_len(self.written)
                .and_then(|()| file.sync_all())
                .map_err(|e| StoreError::io(&self.path, e))?;
        }
        std::fs::rename(&self.path, final_path).map_err(|e| StoreError::io(final_path, e))?;
        self.finalized = true;
        Ok(self.written)
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        drop(self.file.take());
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed incomplete download"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "failed to remove incomplete download"),
        }
    }
}
