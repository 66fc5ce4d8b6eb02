//! Filename extraction from URL path.

/// Extracts the last path segment of `url` for use as a local file name.
///
/// Query and fragment are ignored. Text that `url` cannot parse falls back to
/// whatever follows the final `/`. Returns `None` for an empty segment, `.`,
/// `..`, or a segment containing a path separator after decoding, so the
/// result can always be joined onto a directory without escaping it.
pub fn basename(url: &str) -> Option<String> {
    let segment = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string)?,
        Err(_) => {
            let path = url.split(['?', '#']).next().unwrap_or("");
            path.rsplit('/').find(|s| !s.is_empty())?.to_string()
        }
    };
    if segment == "." || segment == ".." || segment.contains('\\') || segment.contains('\0') {
        return None;
    }
    Some(segment)
}
