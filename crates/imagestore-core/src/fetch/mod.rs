//! Single-stream HTTP GET of one image into the data directory.
//!
//! Uses a libcurl `Easy` handle in the calling thread; call from
//! `spawn_blocking` when driven from async code. The body goes to a `.part`
//! file that is only renamed onto the destination after the byte count matches
//! the declared `Content-Length`. Error-status bodies are never written.

mod parse;

use std::cell::RefCell;
use std::path::Path;
use std::time::Duration;

use crate::control::CancelToken;
use crate::error::StoreError;
use crate::storage::PartFile;
use parse::ResponseHead;

/// libcurl knobs for image transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    /// Abort when throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub max_redirections: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            max_redirections: 10,
        }
    }
}

/// Downloads one URL to one destination path. No retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fetcher {
    opts: FetchOptions,
}

impl Fetcher {
    pub fn new(opts: FetchOptions) -> Self {
        Self { opts }
    }

    /// GET `url` and store the body at `dest`. Returns the number of bytes written.
    ///
    /// Fails with `HttpStatus` for a non-2xx final response,
    /// `MissingContentLength` for a 2xx response that declares no length,
    /// `ShortWrite` when the body does not match `Content-Length` (including a
    /// connection closed early), `Cancelled` when `cancel` trips, `Transport` for other libcurl
    /// failures and `Io` for local write errors. On every failure `dest` is left
    /// untouched and the `.part` file is removed.
    pub fn fetch(&self, url: &str, dest: &Path, cancel: &CancelToken) -> Result<u64, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        tracing::debug!(url, dest = %dest.display(), "GET");

        let sink = RefCell::new(BodySink::new(url, dest, cancel));
        let mut easy = curl::easy::Easy::new();
        self.configure(&mut easy, url)
            .map_err(|e| StoreError::transport(url, e))?;

        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|line| {
                    sink.borrow_mut().head.on_header_line(line);
                    true
                })
                .map_err(|e| StoreError::transport(url, e))?;
            transfer
                .write_function(|data| {
                    // Returning fewer bytes than offered makes libcurl abort the transfer.
                    Ok(if sink.borrow_mut().on_body(data) {
                        data.len()
                    } else {
                        0
                    })
                })
                .map_err(|e| StoreError::transport(url, e))?;
            transfer
                .progress_function(|_, _, _, _| !cancel.is_cancelled())
                .map_err(|e| StoreError::transport(url, e))?;
            transfer.perform()
        };
        let mut sink = sink.into_inner();

        if let Err(e) = performed {
            if cancel.is_cancelled() {
                return Err(StoreError::Cancelled);
            }
            if let Some(err) = sink.error.take() {
                return Err(err);
            }
            if e.is_partial_file() {
                if let Some(expected) = sink.head.content_length {
                    return Err(StoreError::ShortWrite {
                        expected,
                        actual: sink.written(),
                    });
                }
            }
            return Err(StoreError::transport(url, e));
        }

        let status = easy
            .response_code()
            .map_err(|e| StoreError::transport(url, e))?;
        if !(200..=299).contains(&status) {
            return Err(StoreError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let Some(expected) = sink.head.content_length else {
            return Err(StoreError::MissingContentLength {
                url: url.to_string(),
            });
        };
        // An empty 2xx body never reaches the write callback.
        let part = match sink.part.take() {
            Some(part) => part,
            None => PartFile::create(dest)?,
        };
        if part.written() != expected {
            return Err(StoreError::ShortWrite {
                expected,
                actual: part.written(),
            });
        }
        part.finalize(dest)
    }

    fn configure(&self, easy: &mut curl::easy::Easy, url: &str) -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.opts.max_redirections)?;
        easy.connect_timeout(self.opts.connect_timeout)?;
        easy.low_speed_limit(self.opts.low_speed_limit)?;
        easy.low_speed_time(self.opts.low_speed_time)?;
        // Needed for the progress callback that polls the cancel token.
        easy.progress(true)?;
        Ok(())
    }
}

/// Receives body chunks for one transfer. Owns the `.part` file once the
/// final response is known to be 2xx.
struct BodySink<'a> {
    url: &'a str,
    dest: &'a Path,
    cancel: &'a CancelToken,
    head: ResponseHead,
    part: Option<PartFile>,
    error: Option<StoreError>,
}

impl<'a> BodySink<'a> {
    fn new(url: &'a str, dest: &'a Path, cancel: &'a CancelToken) -> Self {
        Self {
            url,
            dest,
            cancel,
            head: ResponseHead::default(),
            part: None,
            error: None,
        }
    }

    /// Returns false to abort the transfer; the reason is kept in `self.error`.
    fn on_body(&mut self, data: &[u8]) -> bool {
        if self.cancel.is_cancelled() {
            self.error = Some(StoreError::Cancelled);
            return false;
        }
        if !self.head.is_success() {
            self.error = Some(StoreError::HttpStatus {
                url: self.url.to_string(),
                status: self.head.status.unwrap_or(0),
            });
            return false;
        }
        if self.head.content_length.is_none() {
            self.error = Some(StoreError::MissingContentLength {
                url: self.url.to_string(),
            });
            return false;
        }
        let result = match self.part.as_mut() {
            Some(part) => part.write(data),
            None => self.open().and_then(|part| part.write(data)),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                self.error = Some(e);
                false
            }
        }
    }

    fn open(&mut self) -> Result<&mut PartFile, StoreError> {
        let mut part = PartFile::create(self.dest)?;
        if let Some(len) = self.head.content_length {
            part.preallocate(len)?;
        }
        Ok(self.part.insert(part))
    }

    fn written(&self) -> u64 {
        self.part.as_ref().map_or(0, PartFile::written)
    }
}
