//! Error type shared by catalog resolution, fetching and the store facade.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed source for configuration failures (TOML, JSON, XDG lookup, ...).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by the image store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Config file or catalog override could not be parsed. No store is built.
    #[error("invalid configuration ({what}): {source}")]
    Config {
        what: String,
        #[source]
        source: BoxError,
    },

    /// Version is not a key of the catalog.
    #[error("missing version entry for {version}")]
    UnknownVersion { version: String },

    /// Version exists but its descriptor lacks the requested asset key.
    #[error("version {version} missing key '{key}'")]
    MissingAsset { version: String, key: String },

    /// Asset URL has no usable final path segment to name the local file.
    #[error("version {version}: cannot derive a file name from {url}")]
    InvalidAssetUrl { version: String, url: String },

    /// Server answered outside 200..=299.
    #[error("request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u32 },

    /// Body length did not match the declared Content-Length.
    #[error("wrote {actual} bytes, but expected to write {expected}")]
    ShortWrite { expected: u64, actual: u64 },

    /// 2xx response without a `Content-Length`, so completeness cannot be checked.
    #[error("response from {url} has no Content-Length; cannot verify the download is complete")]
    MissingContentLength { url: String },

    /// Another populate in this process is already fetching this destination.
    #[error("{} is already being downloaded", path.display())]
    AlreadyFetching { path: PathBuf },

    /// Local image file is absent.
    #[error("image file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Local filesystem failure.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// libcurl failed before a complete response was received.
    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },

    /// Cancellation was requested while the task was pending or in flight.
    #[error("populate cancelled")]
    Cancelled,

    /// A fetch task panicked or could not be joined.
    #[error("fetch task for version {version} failed: {reason}")]
    TaskFailed { version: String, reason: String },
}

impl StoreError {
    pub(crate) fn config(what: impl Into<String>, source: impl Into<BoxError>) -> Self {
        StoreError::Config {
            what: what.into(),
            source: source.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn transport(url: &str, source: curl::Error) -> Self {
        StoreError::Transport {
            url: url.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_log_wording() {
        let e = StoreError::ShortWrite {
            expected: 100,
            actual: 90,
        };
        assert_eq!(e.to_string(), "wrote 90 bytes, but expected to write 100");

        let e = StoreError::MissingAsset {
            version: "4.8".into(),
            key: "iso_url".into(),
        };
        assert_eq!(e.to_string(), "version 4.8 missing key 'iso_url'");

        let e = StoreError::HttpStatus {
            url: "http://h/a.iso".into(),
            status: 404,
        };
        assert_eq!(e.to_string(), "request to http://h/a.iso returned HTTP 404");

        let e = StoreError::MissingContentLength {
            url: "http://h/a.iso".into(),
        };
        assert!(e.to_string().contains("no Content-Length"));
    }

    #[test]
    fn config_error_keeps_source() {
        let e = StoreError::config("RHCOS_VERSIONS", "expected a map");
        assert!(e.to_string().contains("RHCOS_VERSIONS"));
        assert!(std::error::Error::source(&e).is_some());
    }
}
