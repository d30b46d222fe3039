//! Byte ranges: the `Range` request header and the `Content-Range` response header

use http::HeaderValue;

use super::headers::HeaderParseError;

/// Builds the inclusive `Range` header for `length` bytes at `offset`.
///
/// `bytes=0-1023` is a 1024-byte request, so the end is `offset + length - 1`.
/// Returns `None` for a zero-length request, which must not hit the network.
#[must_use]
pub fn range_header(offset: u64, length: u64) -> Option<HeaderValue> {
    if length == 0 {
        return None;
    }
    let end = offset.saturating_add(length - 1);
    HeaderValue::from_str(&format!("bytes={offset}-{end}")).ok()
}

/// A parsed `Content-Range: bytes <start>-<end>/<total>` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: u64,
    pub end: u64,
    /// `None` when the server sent `*`.
    pub total: Option<u64>,
}

/// Parses a `Content-Range` header value.
///
/// # Errors
///
/// Returns `HeaderParseError::InvalidContentRange` for anything other than a
/// satisfied `bytes` range.
pub fn parse_content_range(value: &str) -> Result<ContentRange, HeaderParseError> {
    let invalid = || HeaderParseError::InvalidContentRange(value.to_string());

    let rest = value
        .trim()
        .strip_prefix("bytes")
        .ok_or_else(invalid)?
        .trim_start();
    let (range, total) = rest.split_once('/').ok_or_else(invalid)?;
    let (start, end) = range.trim().split_once('-').ok_or_else(invalid)?;
    let start: u64 = start.trim().parse().map_err(|_| invalid())?;
    let end: u64 = end.trim().parse().map_err(|_| invalid())?;
    if end < start {
        return Err(invalid());
    }
    let total = match total.trim() {
        "*" => None,
        total => Some(total.parse().map_err(|_| invalid())?),
    };
    Ok(ContentRange { start, end, total })
}
