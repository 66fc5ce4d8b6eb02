//! Incremental parsing of response header lines delivered by libcurl.

/// Status and declared length of the response currently being received.
///
/// libcurl reports the headers of every response in a redirect chain; a new
/// status line starts a new head, so after the transfer this describes the
/// final response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseHead {
    /// Status code from the latest status line, if one was seen.
    pub status: Option<u32>,
    /// `Content-Length` of the latest response, if present and numeric.
    pub content_length: Option<u64>,
}

impl ResponseHead {
    /// Feed one raw header line (status line, `Name: value`, or blank terminator).
    pub fn on_header_line(&mut self, raw: &[u8]) {
        let Ok(line) = std::str::from_utf8(raw) else {
            return;
        };
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if line.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("HTTP/")) {
            *self = ResponseHead {
                status: line.split_whitespace().nth(1).and_then(|s| s.parse().ok()),
                content_length: None,
            };
            return;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                self.content_length = value.trim().parse::<u64>().ok();
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(200..=299))
    }
}
